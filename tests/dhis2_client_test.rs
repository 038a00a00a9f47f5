//! Integration tests for the DHIS2 client against a mock Web API server.

use chrono::{TimeZone, Utc};
use facsync::adapters::dhis2::{Dhis2Api, Dhis2Client, PendingChange, StagingDisposition};
use facsync::config::{secret_string, Dhis2AttributeConfig, Dhis2Config, RetryConfig};
use facsync::domain::errors::Dhis2Error;
use facsync::domain::ids::{FacilityId, OrgUnitId};
use facsync::domain::org_unit::{AttributeValue, OrgUnitUpdate};
use serde_json::json;

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 0,
        initial_delay_ms: 1,
        max_delay_ms: 1,
        backoff_multiplier: 1.0,
    }
}

fn config(base_url: &str) -> Dhis2Config {
    Dhis2Config {
        base_url: base_url.to_string(),
        username: "admin".to_string(),
        password: secret_string("district".to_string()),
        tls_verify: true,
        timeout_seconds: 5,
        datastore_namespace: "facility-approvals".to_string(),
        attributes: Dhis2AttributeConfig {
            facility_id: "attrFacId001".to_string(),
            last_updated: "attrLastUpd1".to_string(),
            ownership: "attrOwner001".to_string(),
            settlement: "attrSettle01".to_string(),
            facility_type: "attrFacTyp01".to_string(),
            is_phcu: "attrIsPhcu01".to_string(),
            operational_status: "attrOpStat01".to_string(),
        },
        retry: fast_retry(),
    }
}

fn pending_change() -> PendingChange {
    PendingChange {
        key: FacilityId::new("F1").unwrap(),
        last_updated: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        reason: "field drift: ownership".to_string(),
        record: json!({
            "resource.id": "F1",
            "resource.meta.lastUpdated": "2024-03-01T12:00:00.000Z",
            "isParentPhcu": false
        }),
    }
}

#[tokio::test]
async fn find_by_facility_id_parses_org_units() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "organisationUnits": [{
            "id": "kJq2mPlqjzS",
            "name": "Adama Health Center",
            "code": "CODE-F1",
            "shortName": "Adama HC",
            "openingDate": "2010-06-15",
            "attributeValues": [
                {"attribute": {"id": "attrFacId001"}, "value": "F1"},
                {"attribute": {"id": "attrLastUpd1"}, "value": "2024-01-01T00:00:00.000Z"}
            ],
            "parent": {
                "id": "parentUid001",
                "attributeValues": [
                    {"attribute": {"id": "attrFacId001"}, "value": "P1"}
                ]
            }
        }]
    });

    let mock = server
        .mock("GET", "/organisationUnits.json")
        .match_query(mockito::Matcher::AllOf(vec![
            // mockito's UrlEncoded matcher collapses repeated keys into a
            // HashMap, so the duplicated `filter` params must be matched
            // against the raw query string instead.
            mockito::Matcher::Regex(
                "filter=attributeValues\\.attribute\\.id%3Aeq%3AattrFacId001".into(),
            ),
            mockito::Matcher::Regex("filter=attributeValues\\.value%3Aeq%3AF1".into()),
            mockito::Matcher::UrlEncoded("paging".into(), "false".into()),
        ]))
        .match_header("authorization", mockito::Matcher::Regex("Basic .+".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = Dhis2Client::new(&config(&server.url())).unwrap();
    let units = client.find_by_facility_id("F1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].id.as_str(), "kJq2mPlqjzS");
    assert_eq!(units[0].code.as_deref(), Some("CODE-F1"));
    assert_eq!(
        units[0].parent.as_ref().unwrap().id.as_str(),
        "parentUid001"
    );
}

#[tokio::test]
async fn find_returns_empty_list_when_nothing_matches() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/organisationUnits.json")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(json!({"organisationUnits": []}).to_string())
        .create_async()
        .await;

    let client = Dhis2Client::new(&config(&server.url())).unwrap();
    let units = client.find_by_facility_id("UNKNOWN").await.unwrap();
    assert!(units.is_empty());
}

#[tokio::test]
async fn unauthorized_lookup_maps_to_authentication_failed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/organisationUnits.json")
        .match_query(mockito::Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let client = Dhis2Client::new(&config(&server.url())).unwrap();
    let err = client.find_by_facility_id("F1").await.unwrap_err();
    assert!(matches!(err, Dhis2Error::AuthenticationFailed(_)));
}

#[tokio::test]
async fn update_org_unit_puts_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/organisationUnits/kJq2mPlqjzS")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(json!({"status": "OK"}).to_string())
        .create_async()
        .await;

    let update = OrgUnitUpdate {
        name: "Adama Health Center".to_string(),
        code: Some("CODE-F1".to_string()),
        short_name: Some("Adama HC".to_string()),
        opening_date: chrono::NaiveDate::from_ymd_opt(2010, 6, 15),
        parent: None,
        attribute_values: vec![AttributeValue::new(
            "attrLastUpd1",
            "2024-03-01T12:00:00.000Z",
        )],
        geometry: None,
    };

    let client = Dhis2Client::new(&config(&server.url())).unwrap();
    client
        .update_org_unit(&OrgUnitId::new("kJq2mPlqjzS").unwrap(), &update)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn failed_update_maps_to_update_failed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PUT", "/organisationUnits/kJq2mPlqjzS")
        .with_status(409)
        .with_body("conflict")
        .create_async()
        .await;

    let update = OrgUnitUpdate {
        name: "X".to_string(),
        code: None,
        short_name: None,
        opening_date: None,
        parent: None,
        attribute_values: vec![],
        geometry: None,
    };

    let client = Dhis2Client::new(&config(&server.url())).unwrap();
    let err = client
        .update_org_unit(&OrgUnitId::new("kJq2mPlqjzS").unwrap(), &update)
        .await
        .unwrap_err();

    assert!(matches!(err, Dhis2Error::UpdateFailed(_)));
}

#[tokio::test]
async fn staging_creates_entry_when_absent() {
    let mut server = mockito::Server::new_async().await;
    let get = server
        .mock("GET", "/dataStore/facility-approvals/F1")
        .with_status(404)
        .create_async()
        .await;
    let post = server
        .mock("POST", "/dataStore/facility-approvals/F1")
        .with_status(201)
        .create_async()
        .await;

    let client = Dhis2Client::new(&config(&server.url())).unwrap();
    let disposition = client.stage_pending_change(&pending_change()).await.unwrap();

    get.assert_async().await;
    post.assert_async().await;
    assert_eq!(disposition, StagingDisposition::Created);
}

#[tokio::test]
async fn staging_replaces_stale_entry() {
    let mut server = mockito::Server::new_async().await;
    // existing entry staged at an older registry version
    let existing = json!({
        "reason": "field drift: ownership",
        "stagedAt": "2024-02-01T00:00:00Z",
        "record": {"resource.meta.lastUpdated": "2024-02-01T00:00:00.000Z"}
    });
    server
        .mock("GET", "/dataStore/facility-approvals/F1")
        .with_status(200)
        .with_body(existing.to_string())
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/dataStore/facility-approvals/F1")
        .with_status(200)
        .create_async()
        .await;

    let client = Dhis2Client::new(&config(&server.url())).unwrap();
    let disposition = client.stage_pending_change(&pending_change()).await.unwrap();

    put.assert_async().await;
    assert_eq!(disposition, StagingDisposition::Replaced);
}

#[tokio::test]
async fn staging_is_idempotent_per_registry_version() {
    let mut server = mockito::Server::new_async().await;
    // entry already staged at exactly the incoming version
    let existing = json!({
        "reason": "field drift: ownership",
        "stagedAt": "2024-03-01T12:30:00Z",
        "record": {"resource.meta.lastUpdated": "2024-03-01T12:00:00.000Z"}
    });
    server
        .mock("GET", "/dataStore/facility-approvals/F1")
        .with_status(200)
        .with_body(existing.to_string())
        .create_async()
        .await;
    let write = server
        .mock("PUT", "/dataStore/facility-approvals/F1")
        .expect(0)
        .create_async()
        .await;

    let client = Dhis2Client::new(&config(&server.url())).unwrap();
    let disposition = client.stage_pending_change(&pending_change()).await.unwrap();

    write.assert_async().await;
    assert_eq!(disposition, StagingDisposition::AlreadyCurrent);
}
