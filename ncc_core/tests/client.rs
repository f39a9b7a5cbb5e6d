use std::str::FromStr;

use httpmock::prelude::*;
use ncc_core::{
    chrono::NaiveDate, Calendar, CalendarView, Client, ClientConfig, DateRange, Error, Status,
};

static CALENDAR_JSON: &str = include_str!("../src/calendar_client/tests/calendar.json");

fn client(server: &MockServer) -> Client {
    Client::new(ClientConfig::new("secret").with_base_url(server.url("/GetCalendar")))
}

fn today() -> NaiveDate {
    NaiveDate::from_str("2022-06-09").unwrap()
}

async fn get_calendar(server: &MockServer, views: CalendarView) -> Calendar {
    client(server)
        .get_calendar_on(today(), views, true)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_get_calendar_sends_key_and_range() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/GetCalendar")
                .header("Ocp-Apim-Subscription-Key", "secret")
                .query_param("fromdate", "06/08/2022")
                .query_param("todate", "09/06/2022");
            then.status(200)
                .header("Content-Type", "application/json")
                .body(CALENDAR_JSON);
        })
        .await;

    let calendar = get_calendar(&server, CalendarView::none()).await;
    api_mock.assert_async().await;

    let by_date = calendar.by_date.unwrap();
    assert_eq!(by_date.len(), 10);
    let days_ahead = calendar.days_ahead.unwrap();
    assert_eq!(days_ahead.len(), 8);
    assert_eq!(days_ahead[&0].date, today());
    assert_eq!(days_ahead[&-1].date, NaiveDate::from_str("2022-06-08").unwrap());
    assert_eq!(days_ahead[&6].date, NaiveDate::from_str("2022-06-15").unwrap());
}

#[tokio::test]
async fn test_get_calendar_next_exceptions() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/GetCalendar");
            then.status(200).body(CALENDAR_JSON);
        })
        .await;

    let calendar = get_calendar(&server, CalendarView::NextExceptions).await;
    assert!(calendar.by_date.is_none());
    assert!(calendar.days_ahead.is_none());
    let next_exceptions = calendar.next_exceptions.unwrap();

    let parking = next_exceptions.parking.unwrap();
    assert_eq!(parking.date, today());
    assert_eq!(parking.status, Status::Suspended);
    assert_eq!(parking.exception_name.as_deref(), Some("Anniversary Day"));

    let trash = next_exceptions.trash.unwrap();
    assert_eq!(trash.date, NaiveDate::from_str("2022-06-14").unwrap());
    assert_eq!(trash.status, Status::Delayed);
    assert_eq!(trash.exception_name, None);

    let school = next_exceptions.school.unwrap();
    assert_eq!(school.date, today());
    assert_eq!(school.status, Status::StaffOnly);
}

#[tokio::test]
async fn test_fetch_unauthorized() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/GetCalendar");
            then.status(401).body(r#"{"statusCode": 401, "message": "Access denied"}"#);
        })
        .await;

    let range = DateRange::around(today(), 90).unwrap();
    let err = client(&server).fetch(range).await.unwrap_err();
    assert!(matches!(err, Error::Status(status) if status.as_u16() == 401));
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_fetch_server_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/GetCalendar");
            then.status(503);
        })
        .await;

    let err = client(&server)
        .get_calendar_on(today(), CalendarView::ByDate, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status(status) if status.as_u16() == 503));
    assert!(!err.is_auth_failure());
}

#[tokio::test]
async fn test_fetch_malformed_payload() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/GetCalendar");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = client(&server)
        .get_calendar_on(today(), CalendarView::ByDate, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn test_get_calendar_unknown_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/GetCalendar");
            then.status(200).body(
                r#"{"days": [{"today_id": "20220609", "items": [
                    {"status": "IN EFFECT", "type": "Alternate Side Parking"},
                    {"status": "ON SCHEDULE", "type": "Collections"},
                    {"status": "HYBRID", "type": "Schools"}
                ]}]}"#,
            );
        })
        .await;

    let err = client(&server)
        .get_calendar(CalendarView::none(), false)
        .await
        .unwrap_err();
    match err {
        Error::UnknownServiceOrStatus { date, fragment } => {
            assert_eq!(date, today());
            assert!(fragment.contains("HYBRID"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_client_config_debug_hides_api_key() {
    let config = ClientConfig::new("secret-key").with_base_url("http://localhost/GetCalendar");
    let debug = format!("{:?}", Client::new(config));
    assert!(!debug.contains("secret-key"));
    assert!(debug.contains("<redacted>"));
    assert!(debug.contains("http://localhost/GetCalendar"));
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    let config = ClientConfig::new("secret").with_base_url("http://127.0.0.1:9/GetCalendar");
    let client = Client::new(config);
    let err = client.fetch(DateRange::around(today(), 1).unwrap()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
