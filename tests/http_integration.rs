// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP collaborators using wiremock.

use carwatch::notify::{Notifier, TelegramConfig};
use carwatch::provider::{GrafanaConfig, RangeStatsProvider};
use carwatch::{NotifyError, ProviderError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn frame(projected: f64, usable: f64) -> serde_json::Value {
    serde_json::json!({
        "results": {
            "A": {
                "status": 200,
                "frames": [{
                    "schema": {
                        "fields": [
                            { "name": "projected_range", "type": "number" },
                            { "name": "avg_battery_level", "type": "number" },
                            { "name": "avg_usable_battery_level", "type": "number" },
                            { "name": "current_odometer", "type": "number" }
                        ]
                    },
                    "data": {
                        "values": [[projected], [usable + 1.0], [usable], [42_000.0]]
                    }
                }]
            }
        }
    })
}

// ============================================================================
// Grafana Range Provider Tests
// ============================================================================

mod grafana_provider {
    use super::*;

    #[tokio::test]
    async fn queries_datasource_with_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/ds/query"))
            .and(header("authorization", "Bearer glsa_test"))
            .and(body_partial_json(serde_json::json!({
                "queries": [{ "refId": "A", "datasource": { "uid": "TeslaMate" } }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(frame(375.0, 80.0)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = GrafanaConfig::new(mock_server.uri(), "TeslaMate")
            .with_token("glsa_test")
            .into_provider()
            .unwrap();

        let stats = provider.range_stats(1).await.unwrap();
        assert_eq!(stats.usable_range_km(), 300);
        assert_eq!(stats.usable_battery_level(), 80);
    }

    #[tokio::test]
    async fn substitutes_car_id_in_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/ds/query"))
            .and(body_partial_json(serde_json::json!({
                "queries": [{ "rawSql": "SELECT * FROM range_stats WHERE car_id = 5" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(frame(400.0, 50.0)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = GrafanaConfig::new(mock_server.uri(), "uid")
            .with_query("SELECT * FROM range_stats WHERE car_id = $car_id")
            .into_provider()
            .unwrap();

        let stats = provider.range_stats(5).await.unwrap();
        assert_eq!(stats.usable_range_km(), 200);
    }

    #[tokio::test]
    async fn server_error_is_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let provider = GrafanaConfig::new(mock_server.uri(), "uid")
            .into_provider()
            .unwrap();

        let err = provider.range_stats(1).await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
    }

    #[tokio::test]
    async fn empty_frames_is_empty_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": { "A": { "status": 200, "frames": [] } }
            })))
            .mount(&mock_server)
            .await;

        let provider = GrafanaConfig::new(mock_server.uri(), "uid")
            .into_provider()
            .unwrap();

        let err = provider.range_stats(1).await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResult));
    }
}

// ============================================================================
// Telegram Notifier Tests
// ============================================================================

mod telegram_notifier {
    use super::*;

    #[tokio::test]
    async fn posts_message_to_chat() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": "42",
                "text": "hello"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let notifier = TelegramConfig::new("123:abc", "42")
            .with_api_base(mock_server.uri())
            .into_notifier()
            .unwrap();

        notifier.send_text("hello").await.unwrap();
    }

    #[tokio::test]
    async fn rejected_message_reports_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"ok":false,"description":"chat not found"}"#),
            )
            .mount(&mock_server)
            .await;

        let notifier = TelegramConfig::new("123:abc", "0")
            .with_api_base(mock_server.uri())
            .into_notifier()
            .unwrap();

        let err = notifier.send_text("hello").await.unwrap_err();
        match err {
            NotifyError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("chat not found"));
            }
            other => panic!("Expected Rejected, got {other:?}"),
        }
    }
}
