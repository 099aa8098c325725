//! Integration tests for the NASDAQ symbol directory over HTTP.

use nasdaq_data::{DataError, NasdaqListedProvider, SymbolListProvider};

const BODY: &str = "\
Symbol|Security Name|Market Category|Test Issue|Financial Status|Round Lot Size|ETF|NextShares
AAA|Alpha Corp - Common Stock|Q|N|N|100|N|N
BBB|Beta Inc - Common Stock|G|N|N|100|N|N
ZZZT|Test Issue|G|Y|N|100|N|N
File Creation Time: 0119202622:01|||||||
";

const PATH: &str = "/dynamic/SymDir/nasdaqlisted.txt";

#[tokio::test]
async fn test_fetch_symbols_from_server() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", PATH)
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body(BODY)
        .create_async()
        .await;

    let provider = NasdaqListedProvider::new()
        .unwrap()
        .with_url(format!("{}{}", server.url(), PATH))
        .with_test_issues(false);

    let listings = provider.fetch_symbols().await.unwrap();
    let symbols: Vec<&str> = listings.iter().map(|l| l.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAA", "BBB"]);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_fetch_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", PATH)
        .with_status(503)
        .create_async()
        .await;

    let provider = NasdaqListedProvider::new()
        .unwrap()
        .with_url(format!("{}{}", server.url(), PATH));

    let err = provider.fetch_symbols().await.unwrap_err();
    assert!(matches!(err, DataError::FetchError(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn test_unparseable_body_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", PATH)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let provider = NasdaqListedProvider::new()
        .unwrap()
        .with_url(format!("{}{}", server.url(), PATH));

    let err = provider.fetch_symbols().await.unwrap_err();
    assert!(matches!(err, DataError::ParseError(_)), "unexpected: {err:?}");
}
