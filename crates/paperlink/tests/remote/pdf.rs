use paperlink::pdf::first_page_text_from_bytes;

use super::*;

#[test]
fn test_extracts_first_page_from_bytes() -> TestResult<()> {
  let bytes = pdf_with_lines(&["Alice Smith   Bob Lee", "Massachusetts Institute of Technology"]);
  let text = first_page_text_from_bytes(&bytes)?;

  assert!(text.contains("Alice Smith Bob Lee"), "{text:?}");
  assert!(text.contains("Massachusetts Institute of Technology"), "{text:?}");
  assert!(!text.contains('\n'));
  assert_eq!(text, text.trim());
  Ok(())
}

#[tokio::test]
async fn test_downloads_and_extracts() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/pdf/2502.06789v1"))
    .respond_with(
      ResponseTemplate::new(200)
        .insert_header("content-type", "application/pdf")
        .set_body_bytes(pdf_with_lines(&["Alice Smith", "MIT CSAIL"])),
    )
    .mount(&server)
    .await;

  let extractor = PdfExtractor::new(test_client());
  let text = extractor.first_page_text(&format!("{}/pdf/2502.06789v1", server.uri())).await;
  assert!(text.contains("Alice Smith"), "{text:?}");
  assert!(text.contains("MIT CSAIL"), "{text:?}");
}

#[tokio::test]
async fn test_failures_degrade_to_empty_text() {
  let server = MockServer::start().await;
  Mock::given(path("/missing.pdf")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
  Mock::given(path("/html.pdf"))
    .respond_with(ResponseTemplate::new(200).set_body_string("<html>Rate limited</html>"))
    .mount(&server)
    .await;
  Mock::given(path("/slow.pdf"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_bytes(pdf_with_lines(&["Too late"]))
        .set_delay(Duration::from_secs(5)),
    )
    .mount(&server)
    .await;

  let extractor = PdfExtractor::new(test_client());
  for route in ["/missing.pdf", "/html.pdf", "/slow.pdf"] {
    let text = extractor.first_page_text(&format!("{}{route}", server.uri())).await;
    assert_eq!(text, "", "{route} should degrade to empty text");
  }

  let result = extractor.try_first_page_text(&format!("{}/missing.pdf", server.uri())).await;
  assert!(matches!(result, Err(PaperlinkError::ApiError(msg)) if msg.contains("404")));
  let result = extractor.try_first_page_text(&format!("{}/slow.pdf", server.uri())).await;
  assert!(matches!(result, Err(PaperlinkError::Network(e)) if e.is_timeout()));
}
