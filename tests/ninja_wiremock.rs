use anyhow::Result;
use chrono::NaiveDate;
use stashworth::league::LeagueKey;
use stashworth::rates::providers::NinjaRateSource;
use stashworth::rates::{normalize, RateCategory, RateSource};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[tokio::test]
async fn currency_feed_uses_currency_overview() -> Result<()> {
    let server = MockServer::start().await;
    let source = NinjaRateSource::new()
        .with_base_url(server.uri())
        .with_user_agent("stashworth-test");

    let body = r#"{
        "lines": [
            {"currencyTypeName": "Exalted Orb", "chaosEquivalent": 60.0, "receive": {"count": 42}}
        ],
        "currencyDetails": [
            {"id": 2, "name": "Exalted Orb", "icon": "https://example.invalid/ex.png", "poeTradeId": "exa"}
        ]
    }"#;

    Mock::given(method("GET"))
        .and(path("/api/data/currencyoverview"))
        .and(query_param("league", "Hardcore Bestiary"))
        .and(query_param("type", "Currency"))
        .and(query_param("date", "2024-06-01"))
        .and(header("User-Agent", "stashworth-test"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let response = source
        .fetch_rates(RateCategory::Currency, &LeagueKey::new("SSF Bestiary HC"), date())
        .await?;
    assert_eq!(response.status, 200);

    let payload = response.data.expect("expected payload");
    let entries = normalize(RateCategory::Currency, &payload);
    assert_eq!(entries.len(), 2);

    let exalted = &entries[0];
    assert_eq!(exalted.name, "Exalted Orb");
    assert_eq!(exalted.chaos_value, 60.0);
    assert_eq!(exalted.sample_count, Some(42));
    assert_eq!(exalted.trade_id.as_deref(), Some("exa"));

    let chaos = &entries[1];
    assert_eq!(chaos.name, "Chaos Orb");
    assert_eq!(chaos.chaos_value, 1.0);
    assert_eq!(chaos.exalted_value, Some(60.0));
    Ok(())
}

#[tokio::test]
async fn item_feed_uses_item_overview() -> Result<()> {
    let server = MockServer::start().await;
    let source = NinjaRateSource::new().with_base_url(server.uri());

    let body = r#"{"lines": [
        {"name": "Enhance Support", "gemLevel": 3, "gemQuality": 20, "corrupted": true, "chaosValue": 300.5, "count": 7}
    ]}"#;

    Mock::given(method("GET"))
        .and(path("/api/data/itemoverview"))
        .and(query_param("type", "SkillGem"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let response = source
        .fetch_rates(RateCategory::Gem, &LeagueKey::new("Standard"), date())
        .await?;
    let entries = normalize(RateCategory::Gem, &response.data.expect("expected payload"));

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].gem_level, Some(3));
    assert_eq!(entries[0].gem_quality, Some(20));
    assert_eq!(entries[0].corrupted, Some(true));
    assert_eq!(entries[0].chaos_value, 300.5);
    Ok(())
}

#[tokio::test]
async fn error_statuses_pass_through() -> Result<()> {
    let server = MockServer::start().await;
    let source = NinjaRateSource::new().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/api/data/itemoverview"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let response = source
        .fetch_rates(RateCategory::Scarab, &LeagueKey::new("Standard"), date())
        .await?;
    assert_eq!(response.status, 429);
    assert!(response.data.is_none());
    Ok(())
}

#[tokio::test]
async fn undecodable_body_is_an_empty_success() -> Result<()> {
    let server = MockServer::start().await;
    let source = NinjaRateSource::new().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/api/data/currencyoverview"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>down</html>", "text/html"))
        .mount(&server)
        .await;

    let response = source
        .fetch_rates(RateCategory::Fragment, &LeagueKey::new("Standard"), date())
        .await?;
    assert_eq!(response.status, 200);
    assert!(response.data.is_none());
    Ok(())
}
