//! Canned municipal pages and upload bodies.

use project_scout::testing::MockFetcher;
use project_scout::ErrorKind;

pub const FONTANA_URL: &str = "https://www.fontana.org/projects";
pub const CORONA_URL: &str = "https://www.corona.gov/capital-projects";
pub const BROKEN_URL: &str = "https://www.broken.gov/projects";

pub const FONTANA_HTML: &str = r#"<html>
<head>
  <title>Fontana Capital Improvement Projects</title>
  <meta name="description" content="Sierra Avenue widening, a $4.2 million public works construction project">
</head>
<body>
  <h1>Capital Improvement Projects</h1>
  <p>Infrastructure and construction projects managed by Public Works.</p>
</body>
</html>"#;

pub const CORONA_HTML: &str = r#"<html>
<head>
  <title>Corona Capital Projects</title>
  <meta name="description" content="Park renovation and bid opportunities">
  <script type="application/ld+json">{"status": "Open", "buyer": "City of Corona"}</script>
</head>
<body>
  <p>Construction project updates for residents.</p>
</body>
</html>"#;

/// Fetcher serving two good pages and one that always times out.
pub fn city_fetcher() -> MockFetcher {
    MockFetcher::new()
        .with_page(FONTANA_URL, FONTANA_HTML)
        .with_page(CORONA_URL, CORONA_HTML)
        .fail_text(BROKEN_URL, ErrorKind::Network("timed out".into()))
}

/// A `Source URL` upload body for the given URLs.
pub fn urls_csv(urls: &[&str]) -> String {
    let mut body = String::from("Source URL,Notes\n");
    for url in urls {
        body.push_str(url);
        body.push_str(",\n");
    }
    body
}

pub const BOUNDARY: &str = "scout-test-boundary";

/// Encode one file part as a `multipart/form-data` body.
pub fn multipart_body(field: &str, file_name: &str, contents: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\
         \r\n\
         {contents}\r\n\
         --{BOUNDARY}--\r\n"
    )
}
