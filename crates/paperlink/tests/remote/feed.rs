use paperlink::feed::parse_feed;

use super::*;

#[test]
fn test_parse_recorded_feed() -> TestResult<()> {
  let papers = parse_feed(ARXIV_FEED)?;
  assert_eq!(papers.len(), 3);

  let first = &papers[0];
  assert_eq!(first.title, "Linking Authors to Institutions\n  with Language Models");
  assert!(first.summary.starts_with("We study how language models"));
  assert!(first.summary.contains("PDFs & evaluate"));
  assert!(first.summary.ends_with("hallucinated authors."));
  assert_eq!(first.url, "http://arxiv.org/abs/2502.06789v1");
  assert_eq!(first.pub_date, "2025-02-10");
  assert_eq!(first.pdf_url, "http://arxiv.org/pdf/2502.06789v1");
  assert_eq!(first.authors, vec!["Alice Smith", "Bob Lee"]);

  // No explicit PDF link, non-Atom timestamp, and a blank author.
  let second = &papers[1];
  assert_eq!(second.pub_date, "2025-02-10");
  assert_eq!(second.pdf_url, "http://arxiv.org/pdf/2502.06700v2");
  assert_eq!(second.authors, vec!["José Núñez", "李 伟"]);

  let third = &papers[2];
  assert_eq!(third.pub_date, "not-a-date");
  assert_eq!(third.pdf_url, "");
  assert_eq!(third.summary, "");
  assert!(third.authors.is_empty());
  Ok(())
}

#[tokio::test]
async fn test_search_sends_arxiv_query() -> TestResult<()> {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/query"))
    .and(query_param("search_query", "all:language models"))
    .and(query_param("start", "0"))
    .and(query_param("max_results", "3"))
    .and(query_param("sortBy", "submittedDate"))
    .and(query_param("sortOrder", "descending"))
    .respond_with(ResponseTemplate::new(200).set_body_string(ARXIV_FEED))
    .expect(1)
    .mount(&server)
    .await;

  let client = FeedClient::new(test_client(), format!("{}/api/query", server.uri()));
  let papers = client.search("language models", 3).await?;
  assert_eq!(papers.len(), 3);
  assert_eq!(papers[0].authors, vec!["Alice Smith", "Bob Lee"]);
  Ok(())
}

#[tokio::test]
async fn test_search_reports_failed_status() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
    .mount(&server)
    .await;

  let client = FeedClient::new(test_client(), format!("{}/api/query", server.uri()));
  let result = client.search("anything", 10).await;
  assert!(matches!(result, Err(PaperlinkError::ApiError(msg)) if msg.contains("503")));
}

#[tokio::test]
async fn test_search_reports_unreachable_feed() {
  let client = FeedClient::new(test_client(), "http://127.0.0.1:9/api/query");
  assert!(matches!(client.search("anything", 10).await, Err(PaperlinkError::Network(_))));
}
