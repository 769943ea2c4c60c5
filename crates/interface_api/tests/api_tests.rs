//! API Integration Tests
//!
//! Drives the router end to end against the in-memory store loaded with the
//! demo dataset.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use domain_billing::{AccountStatement, InMemoryAccountingStore};
use interface_api::config::{ApiConfig, StorageBackend};
use interface_api::create_router;
use interface_api::dto::accounting::{CancellationResponse, PaymentResponse, PolicyResponse};
use interface_api::seed::DemoDataset;
use test_utils::date;

async fn demo_server() -> (TestServer, DemoDataset) {
    let dataset = DemoDataset::build().unwrap();
    let store = InMemoryAccountingStore::new();
    dataset.load(&store).await.unwrap();

    let config = ApiConfig {
        storage: StorageBackend::Memory,
        ..ApiConfig::default()
    };
    let server = TestServer::new(create_router(Arc::new(store), config)).unwrap();
    (server, dataset)
}

fn policy_path(dataset: &DemoDataset, name: &str, rest: &str) -> String {
    let policy = dataset.policy(name).unwrap();
    format!("/api/v1/policies/{}/{}", policy.id, rest)
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_storage() {
        let (server, _) = demo_server().await;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"], "memory");
    }
}

mod statement_tests {
    use super::*;

    #[tokio::test]
    async fn test_statement_after_first_payment() {
        let (server, dataset) = demo_server().await;

        let response = server
            .get(&policy_path(&dataset, "Policy Two", "statement/2015-02-01"))
            .await;
        response.assert_status_ok();

        let statement: AccountStatement = response.json();
        assert_eq!(statement.balance, 0);
        assert_eq!(statement.invoices.len(), 1);
        assert_eq!(statement.invoices[0].amount_due, 400);
    }

    #[tokio::test]
    async fn test_statement_second_quarter() {
        let (server, dataset) = demo_server().await;

        let statement: AccountStatement = server
            .get(&policy_path(&dataset, "Policy Two", "statement/2015-05-01"))
            .await
            .json();

        assert_eq!(statement.invoices.len(), 2);
        assert_eq!(statement.balance, 400);
        assert_eq!(statement.as_of, date(2015, 5, 1));
    }

    #[tokio::test]
    async fn test_unknown_policy_is_not_found() {
        let (server, _) = demo_server().await;
        let path = format!(
            "/api/v1/policies/{}/statement/2015-02-01",
            core_kernel::PolicyId::new()
        );

        let response = server.get(&path).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_malformed_policy_id_is_bad_request() {
        let (server, _) = demo_server().await;

        let response = server
            .get("/api/v1/policies/not-a-policy/statement/2015-02-01")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

mod payment_tests {
    use super::*;

    #[tokio::test]
    async fn test_payment_by_named_insured() {
        let (server, dataset) = demo_server().await;
        let path = policy_path(&dataset, "Policy Three", "payments");

        let response = server
            .post(&path)
            .json(&json!({ "amount": 100, "transaction_date": "2015-01-10" }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let payment: PaymentResponse = response.json();
        let ryan = dataset
            .contact("Ryan Bucket", domain_party::ContactRole::NamedInsured)
            .unwrap();
        assert_eq!(payment.contact_id, ryan.id);
        assert_eq!(payment.amount_paid, 100);
        assert_eq!(payment.transaction_date, date(2015, 1, 10));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let (server, dataset) = demo_server().await;

        let response = server
            .post(&policy_path(&dataset, "Policy Three", "payments"))
            .json(&json!({ "amount": 0, "transaction_date": "2015-01-10" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_policy_without_named_insured() {
        let (server, dataset) = demo_server().await;

        let response = server
            .post(&policy_path(&dataset, "Policy One", "payments"))
            .json(&json!({ "amount": 365, "transaction_date": "2015-01-05" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["error"], "contact_resolution");
    }
}

mod cancellation_tests {
    use super::*;

    #[tokio::test]
    async fn test_unpaid_monthly_policy_pending_cancellation() {
        let (server, dataset) = demo_server().await;

        let response: CancellationResponse = server
            .get(&policy_path(&dataset, "Policy Three", "cancellation"))
            .add_query_param("as_of", "2015-02-20")
            .await
            .json();

        assert!(response.pending_cancellation);
        assert_eq!(response.as_of, date(2015, 2, 20));
    }

    #[tokio::test]
    async fn test_paid_policy_not_pending() {
        let (server, dataset) = demo_server().await;

        let response: CancellationResponse = server
            .get(&policy_path(&dataset, "Policy Two", "cancellation"))
            .add_query_param("as_of", "2015-03-20")
            .await
            .json();

        assert!(!response.pending_cancellation);
    }

    #[tokio::test]
    async fn test_cancel_policy() {
        let (server, dataset) = demo_server().await;

        let response = server
            .post(&policy_path(&dataset, "Policy Three", "cancel"))
            .json(&json!({ "reason": "Non-payment" }))
            .await;
        response.assert_status_ok();

        let policy: PolicyResponse = response.json();
        assert_eq!(policy.status, "Canceled");
        assert_eq!(policy.cancellation_reason.as_deref(), Some("Non-payment"));
        assert!(policy.status_changed_on.is_some());
    }

    #[tokio::test]
    async fn test_cancel_requires_reason() {
        let (server, dataset) = demo_server().await;

        let response = server
            .post(&policy_path(&dataset, "Policy Three", "cancel"))
            .json(&json!({ "reason": "" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}

mod schedule_tests {
    use super::*;

    #[tokio::test]
    async fn test_change_to_monthly_spreads_remaining_premium() {
        let (server, dataset) = demo_server().await;

        let response = server
            .put(&policy_path(&dataset, "Policy Two", "schedule"))
            .json(&json!({ "billing_schedule": "Monthly", "effective_on": "2015-03-01" }))
            .await;
        response.assert_status_ok();

        let policy: PolicyResponse = response.json();
        assert_eq!(policy.billing_schedule, "Monthly");

        let statement: AccountStatement = server
            .get(&policy_path(&dataset, "Policy Two", "statement/2015-03-01"))
            .await
            .json();
        assert_eq!(statement.balance, 109);
        assert_eq!(statement.invoices.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_schedule_rejected() {
        let (server, dataset) = demo_server().await;

        let response = server
            .put(&policy_path(&dataset, "Policy Two", "schedule"))
            .json(&json!({ "billing_schedule": "Weekly", "effective_on": "2015-03-01" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["error"], "invalid_schedule");
    }

    #[tokio::test]
    async fn test_change_outside_term_rejected() {
        let (server, dataset) = demo_server().await;

        let response = server
            .put(&policy_path(&dataset, "Policy Two", "schedule"))
            .json(&json!({ "billing_schedule": "Monthly", "effective_on": "2016-03-01" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["error"], "change_outside_term");
    }
}
