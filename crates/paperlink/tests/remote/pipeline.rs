use super::*;

/// Feed with three papers whose PDFs live on `base`.
fn feed_for(base: &str) -> String {
  format!(
    r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/0001</id>
    <published>2025-02-10T18:59:58Z</published>
    <title>Readable</title>
    <summary>Has a first page.</summary>
    <author><name>Alice Smith</name></author>
    <author><name>Bob Lee</name></author>
    <link title="pdf" href="{base}/pdf/0001" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/0002</id>
    <published>2025-02-09T10:00:00Z</published>
    <title>Broken PDF</title>
    <summary>Served as HTML.</summary>
    <author><name>Alice Smith</name></author>
    <author><name>Carol X</name></author>
    <link title="pdf" href="{base}/pdf/0002" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/0003</id>
    <published>2025-02-08T10:00:00Z</published>
    <title>Missing PDF</title>
    <summary>404.</summary>
    <author><name>Dana Wu</name></author>
    <link title="pdf" href="{base}/pdf/0003" rel="related" type="application/pdf"/>
  </entry>
</feed>"#
  )
}

async fn arxiv_mock() -> MockServer {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/query"))
    .respond_with(ResponseTemplate::new(200).set_body_string(feed_for(&server.uri())))
    .mount(&server)
    .await;
  Mock::given(path("/pdf/0001"))
    .respond_with(
      ResponseTemplate::new(200).set_body_bytes(pdf_with_lines(&["Alice Smith, Bob Lee", "MIT"])),
    )
    .mount(&server)
    .await;
  Mock::given(path("/pdf/0002"))
    .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
    .mount(&server)
    .await;
  Mock::given(path("/pdf/0003")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
  server
}

fn pipeline_for(server: &MockServer, model: ScriptedModel) -> Pipeline<ScriptedModel> {
  Pipeline::new(
    FeedClient::new(test_client(), format!("{}/api/query", server.uri())),
    PdfExtractor::new(test_client()),
    AffiliationLinker::new(model),
  )
}

#[tokio::test]
async fn test_run_resolves_and_degrades_per_paper() -> TestResult<()> {
  let server = arxiv_mock().await;
  let model = ScriptedModel::answering(
    r#"{"authors":[{"name":"Alice Smith","affiliations":["MIT"]},{"name":"Carol X","affiliations":["X Lab"]}]}"#,
  );
  let pipeline = pipeline_for(&server, model.clone());

  let papers = pipeline.run("affiliations", 3).await?;
  let titles: Vec<&str> = papers.iter().map(|p| p.title.as_str()).collect();
  assert_eq!(titles, vec!["Readable", "Broken PDF", "Missing PDF"]);

  assert_eq!(papers[0].pub_date, "2025-02-10");
  assert_eq!(papers[0].authors, vec![
    AuthorAffiliation { name: "Alice Smith".to_string(), affiliations: vec!["MIT".to_string()] },
    AuthorAffiliation::unknown("Bob Lee"),
  ]);
  assert_eq!(papers[1].authors, vec![
    AuthorAffiliation::unknown("Alice Smith"),
    AuthorAffiliation::unknown("Carol X"),
  ]);
  assert_eq!(papers[2].authors, vec![AuthorAffiliation::unknown("Dana Wu")]);

  // Only the readable PDF reaches the model.
  assert_eq!(model.calls(), 1);
  Ok(())
}

#[tokio::test]
async fn test_model_outage_keeps_authors() -> TestResult<()> {
  let server = arxiv_mock().await;
  let model = ScriptedModel::unavailable();
  let pipeline = pipeline_for(&server, model.clone()).with_concurrency(3);

  let papers = pipeline.run("affiliations", 3).await?;
  assert_eq!(papers.len(), 3);
  assert_eq!(papers[0].title, "Readable");
  assert_eq!(papers[0].authors, vec![
    AuthorAffiliation::unknown("Alice Smith"),
    AuthorAffiliation::unknown("Bob Lee"),
  ]);
  assert!(papers.iter().flat_map(|p| &p.authors).all(|a| a.affiliations.is_empty()));
  assert_eq!(model.calls(), 1);
  Ok(())
}

#[tokio::test]
async fn test_concurrency_keeps_feed_order() {
  let server = arxiv_mock().await;
  let pipeline = pipeline_for(&server, ScriptedModel::answering("{\"authors\": []}"));
  let papers = (1..=8)
    .map(|i| Paper {
      title: format!("paper {i}"),
      // Alternate between a missing PDF and no PDF link at all.
      pdf_url: if i % 2 == 0 { format!("{}/pdf/0003", server.uri()) } else { String::new() },
      authors: vec![format!("Author {i}")],
      ..Default::default()
    })
    .collect::<Vec<_>>();

  let resolved = pipeline.with_concurrency(4).process_all(papers).await;
  let titles: Vec<String> = resolved.iter().map(|p| p.title.clone()).collect();
  assert_eq!(titles, (1..=8).map(|i| format!("paper {i}")).collect::<Vec<_>>());
  assert!(resolved.iter().enumerate().all(|(i, p)| p.authors[0].name == format!("Author {}", i + 1)));
}

#[tokio::test]
async fn test_feed_failure_is_reported() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/query"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;

  let model = ScriptedModel::answering("unused");
  let pipeline = pipeline_for(&server, model.clone());
  assert!(matches!(pipeline.run("anything", 5).await, Err(PaperlinkError::ApiError(_))));
  assert_eq!(model.calls(), 0);
}
