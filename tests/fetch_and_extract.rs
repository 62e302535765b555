//! Exercises the fetch → clean → extract path against a mock HTTP
//! server, without a database.

use newsloom::crawler::fetch::build_http_client;
use newsloom::html::{clean_html, extract_candidate_urls, extract_title};
use scraper::Html;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"
<html>
<head>
  <title>Fallback Title</title>
  <meta property="og:title" content="Real Headline" />
</head>
<body>
  <nav><a href="/login">Login</a></nav>
  <article>
    <p>This is the first paragraph of the article body, long enough to count.</p>
    <p><a href="/articles/next-one">Read the next story</a></p>
  </article>
  <footer>Copyright notice text that should not appear.</footer>
</body>
</html>
"#;

#[tokio::test]
async fn fetches_cleans_and_extracts_a_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let client = build_http_client("newsloom-test/1.0", 10).expect("client builds");
    let url = format!("{}/story", server.uri());
    let resp = client.get(&url).send().await.expect("request succeeds");
    assert!(resp.status().is_success());

    let body = resp.text().await.expect("body readable");

    let cleaned = clean_html(&body, 5_000);
    assert!(cleaned.contains("first paragraph"));
    assert!(!cleaned.contains("Copyright notice"));
    assert!(!cleaned.contains("Login"));

    let document = Html::parse_document(&body);
    let title = extract_title(&document).expect("title present");
    assert_eq!(title, "Real Headline");

    let candidates = extract_candidate_urls(&body, &url, &url, false);
    assert!(candidates.iter().any(|c| c.ends_with("/articles/next-one")));
    assert!(candidates.iter().any(|c| c.ends_with("/login")));
}
