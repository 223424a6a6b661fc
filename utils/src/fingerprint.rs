//! Response Fingerprint (spec §4.1): the canonical, cleaned representation
//! of an HTTP response used for every downstream comparison.

use s404_types::{DocType, FourOhFourResponse, HttpResponse};

use crate::clean::clean_body;

/// Build a signature from a raw HTTP response. Total — no error path; a
/// response that can't be cleaned meaningfully is still a valid signature,
/// just an uncleaned one.
#[must_use]
pub fn build(response: &HttpResponse) -> FourOhFourResponse {
    let body_str = response.body_str();
    let last_segment = last_path_segment(response.url.as_str());
    let cleaned = clean_body(&body_str, response.url.as_str(), &last_segment);

    let content_type = response.headers.get("content-type");
    let doc_type = DocType::classify(&response.body, content_type);

    FourOhFourResponse::new(
        response.url.clone(),
        response.id,
        response.code,
        doc_type,
        response.url.normalized_path(),
        cleaned,
    )
}

fn last_path_segment(url: &str) -> String {
    url.rsplit('/').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use s404_types::{Headers, Url};

    use super::*;

    fn response(url: &str, body: &str) -> HttpResponse {
        HttpResponse {
            id: 1,
            url: Url::parse(url).unwrap(),
            code: 200,
            reason: "OK".to_string(),
            headers: Headers::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn strips_reflected_url_from_body() {
        let r = response("http://h/x/missing", "<html>Not found: http://h/x/missing</html>");
        let sig = build(&r);
        assert!(!sig.body.contains("http://h/x/missing"));
    }

    #[test]
    fn normalized_path_is_the_directory() {
        let r = response("http://h/x/missing", "");
        let sig = build(&r);
        assert_eq!(sig.normalized_path.as_str(), "http://h/x/");
    }

    #[test]
    fn classifies_doc_type_from_body() {
        let r = response("http://h/x/missing", "<html><body>not found</body></html>");
        let sig = build(&r);
        assert_eq!(sig.doc_type, s404_types::DocType::Html);
    }
}
