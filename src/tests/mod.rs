use std::io::Write;

use chrono::{NaiveDate, NaiveDateTime};
use mockito::Matcher;

use crate::catalog::{CatalogClient, ClientOptions, SortKey};
use crate::output::{self, OutputFormat, PageView};
use crate::pipeline::Truncation;
use crate::session::{Action, Controls, Outcome, Session};

const NIKE_BODY: &str = r#"{
  "result": [
    {"name":"Air Shirt","brandName":"Nike","price":35,"img":"https://i/1","link":"https://l/1","date":"2026-10-17"},
    {"name":"Court Pants","brandName":"Nike","price":80,"img":"https://i/2","link":"https://l/2","date":"2026-08-01"},
    {"name":"Tee","brandName":"Nike","price":15,"img":"https://i/3","link":"https://l/3","date":"2026-10-15"},
    {"name":"Hoodie","brandName":"Nike","price":60,"img":"https://i/4","link":"https://l/4","date":"2025-12-24"},
    {"name":"Socks","brandName":"Nike","price":5,"img":"https://i/5","link":"https://l/5","date":"2026-01-02"}
  ],
  "meta": {"count": 5}
}"#;

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn session_for(server: &mockito::Server, truncation: Truncation) -> Session {
    let client = CatalogClient::new(ClientOptions {
        base_url: server.url(),
        ..ClientOptions::default()
    })
    .unwrap();
    Session::new(client, truncation, Controls::default()).with_clock(fixed_now)
}

fn applied(outcome: Outcome) -> crate::session::AppState {
    match outcome {
        Outcome::Applied(state) => state,
        other => panic!("expected applied outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn nike_price_desc_empty_search() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/products/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "3000".into()),
            Matcher::UrlEncoded("brandName".into(), "Nike".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(NIKE_BODY)
        .expect(3)
        .create_async()
        .await;

    let session = session_for(&server, Truncation::Legacy);
    applied(
        session
            .run(Action::Brand(Some("Nike".to_string())))
            .await
            .unwrap(),
    );
    applied(
        session
            .run(Action::Sort(Some(SortKey::PriceDesc)))
            .await
            .unwrap(),
    );
    let state = applied(session.run(Action::Search(String::new())).await.unwrap());
    mock.assert_async().await;

    let names: Vec<_> = state.products.iter().map(|p| p.name.as_str()).collect();
    // five results, page size 12: the cheapest product is dropped
    assert_eq!(names, vec!["Court Pants", "Hoodie", "Air Shirt", "Tee"]);
    assert_eq!(state.controls.brand.as_deref(), Some("Nike"));
    assert_eq!(state.controls.sort, Some(SortKey::PriceDesc));
    assert_eq!(state.indicators.brands, 1);
    assert_eq!(state.indicators.recent, 2);
    assert_eq!(state.indicators.p50, Some(35.0));
    assert_eq!(state.indicators.last_released.as_deref(), Some("2026-10-17"));
    assert_eq!(state.pagination, Some(serde_json::json!({"count": 5})));
}

#[tokio::test]
async fn search_sends_no_price_bound() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/products/search")
        .match_query(Matcher::Regex("^limit=3000$".to_string()))
        .with_status(200)
        .with_body(NIKE_BODY)
        .create_async()
        .await;

    let session = session_for(&server, Truncation::Exact);
    let state = applied(session.run(Action::Search("SHIRT".to_string())).await.unwrap());
    assert_eq!(state.products.len(), 1);
    assert_eq!(state.products[0].name, "Air Shirt");
}

#[tokio::test]
async fn reasonable_price_and_range_filter() {
    let mut server = mockito::Server::new_async().await;
    let reasonable = server
        .mock("GET", "/products/search")
        .match_query(Matcher::UrlEncoded("price".into(), "50".into()))
        .with_status(200)
        .with_body(NIKE_BODY)
        .create_async()
        .await;
    let ranged = server
        .mock("GET", "/products/search")
        .match_query(Matcher::UrlEncoded("price".into(), "70".into()))
        .with_status(200)
        .with_body(NIKE_BODY)
        .create_async()
        .await;

    let session = session_for(&server, Truncation::Exact);
    let state = applied(session.run(Action::ReasonablePrice).await.unwrap());
    reasonable.assert_async().await;
    assert_eq!(state.products.len(), 5);

    let state = applied(
        session
            .run(Action::PriceRange {
                min: 10.0,
                max: 70.0,
            })
            .await
            .unwrap(),
    );
    ranged.assert_async().await;
    let mut prices: Vec<_> = state.products.iter().map(|p| p.price).collect();
    prices.sort_by(f64::total_cmp);
    assert_eq!(prices, vec![15.0, 35.0, 60.0]);
}

#[tokio::test]
async fn show_truncates_sorted_result() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/products/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(NIKE_BODY)
        .create_async()
        .await;

    let session = session_for(&server, Truncation::Legacy);
    session
        .run(Action::Sort(Some(SortKey::PriceAsc)))
        .await
        .unwrap();
    let state = applied(session.run(Action::Show(2)).await.unwrap());
    let prices: Vec<_> = state.products.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![5.0, 15.0]);
    assert_eq!(session.controls().await.size, 2);
}

#[tokio::test]
async fn failed_fetch_is_reported_not_masked() {
    let mut server = mockito::Server::new_async().await;
    let _ok = server
        .mock("GET", "/products/search")
        .match_query(Matcher::UrlEncoded("brandName".into(), "Nike".into()))
        .with_status(200)
        .with_body(NIKE_BODY)
        .create_async()
        .await;
    let _broken = server
        .mock("GET", "/products/search")
        .match_query(Matcher::Regex("^limit=3000$".to_string()))
        .with_status(200)
        .with_body("{\"result\": [")
        .create_async()
        .await;

    let session = session_for(&server, Truncation::Exact);
    applied(
        session
            .run(Action::Brand(Some("Nike".to_string())))
            .await
            .unwrap(),
    );

    match session.run(Action::Brand(None)).await.unwrap() {
        Outcome::Failed { error, state, .. } => {
            assert!(error.to_string().contains("failed to decode"));
            assert_eq!(state.products.len(), 5);
            assert_eq!(state.controls.brand.as_deref(), Some("Nike"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(session.snapshot().await.products.len(), 5);
    // the control itself did change
    assert_eq!(session.controls().await.brand, None);
}

#[tokio::test]
async fn overlapping_dispatches_keep_latest_issued() {
    let mut server = mockito::Server::new_async().await;
    let _slow = server
        .mock("GET", "/products/search")
        .match_query(Matcher::UrlEncoded("brandName".into(), "Adidas".into()))
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_millis(400));
            w.write_all(NIKE_BODY.as_bytes())
        })
        .create_async()
        .await;
    let _fast = server
        .mock("GET", "/products/search")
        .match_query(Matcher::UrlEncoded("brandName".into(), "Nike".into()))
        .with_status(200)
        .with_body(NIKE_BODY)
        .create_async()
        .await;

    let session = session_for(&server, Truncation::Exact);
    let first = session
        .dispatch(Action::Brand(Some("Adidas".to_string())))
        .await;
    let second = session
        .dispatch(Action::Brand(Some("Nike".to_string())))
        .await;

    let state = applied(second.await.unwrap());
    assert_eq!(state.applied_seq, 2);
    assert!(matches!(
        first.await.unwrap(),
        Outcome::Stale { seq: 1, latest: 2 }
    ));

    let state = session.snapshot().await;
    assert_eq!(state.applied_seq, 2);
    assert_eq!(state.controls.brand.as_deref(), Some("Nike"));
}

#[tokio::test]
async fn rendered_page_is_replaced_not_appended() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/products/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(NIKE_BODY)
        .create_async()
        .await;

    let session = session_for(&server, Truncation::Exact);
    let state = applied(session.run(Action::Refresh).await.unwrap());
    let view = PageView {
        controls: &state.controls,
        products: &state.products,
        indicators: &state.indicators,
        error: None,
    };
    let rendered = output::render(&view, OutputFormat::Html).unwrap();

    let path = std::env::temp_dir().join(format!(
        "catalog-browser-page-{}.html",
        std::process::id()
    ));
    let path = path.to_string_lossy().to_string();
    output::write_output(&path, &rendered).await.unwrap();
    let first = tokio::fs::read_to_string(&path).await.unwrap();
    output::write_output(&path, &rendered).await.unwrap();
    let second = tokio::fs::read_to_string(&path).await.unwrap();
    let _ = tokio::fs::remove_file(&path).await;

    assert_eq!(first, second);
    assert_eq!(first.matches(r#"class="product "#).count(), 5);
    assert!(first.contains(r#"<span id="nbBrands" class="text-xl font-bold">1</span>"#));

    let json = output::render(&view, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["products"].as_array().unwrap().len(), 5);
    assert_eq!(value["indicators"]["brands"], 1);
}
