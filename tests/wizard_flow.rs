mod support;

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;

use property_desk::inquiry::{InquiryError, InquiryForm, ScheduleBoard};
use property_desk::model::{Coordinates, PropertyRecord, ViewingSchedule};
use property_desk::validation::{Field, InquiryField};
use property_desk::wizard::{FormDraft, Submitted, Wizard, WizardError, WizardStep};
use support::{record, status_error, RecordingApi};

fn complete_draft() -> FormDraft {
    let mut draft = FormDraft {
        title: "Lakeside villa".into(),
        description: "Five-bedroom villa with a private jetty".into(),
        price: 1_250_000.0,
        property_type: "Villa".into(),
        status: "For Sale".into(),
        bedrooms: 5.0,
        bathrooms: 2.5,
        area_sq_ft: 4200.0,
        ..Default::default()
    };
    draft.location.address = "8 Shore Ln".into();
    draft.location.city = "Lake Placid".into();
    draft.location.state = "NY".into();
    draft.location.country = "US".into();
    draft.location.coordinates = Coordinates { lat: 44.28, lng: -73.98 };
    draft.amenities.insert("Pool");
    draft
}

fn wizard_on_last_step() -> Wizard {
    let mut wizard = Wizard::new();
    wizard.open(None);
    *wizard.draft_mut().unwrap() = complete_draft();
    for _ in 0..3 {
        wizard.advance().unwrap();
    }
    assert_eq!(wizard.step(), WizardStep::Amenities);
    wizard
}

fn seeded_record() -> PropertyRecord {
    serde_json::from_value(json!({
        "id": "p-42",
        "title": "Old title",
        "description": "Existing description text",
        "price": "800",
        "type": "Studio",
        "status": "For Rent",
        "bedrooms": 0,
        "bathrooms": 1,
        "areaSqFt": 400,
        "amenities": ["Gym Access"],
        "location": {
            "address": "1 Elm", "city": "Austin", "state": "TX", "country": "US",
            "coordinates": { "lat": 30.27, "lng": -97.74 }
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn create_submits_payload_and_closes() {
    let api = RecordingApi::new();
    api.push_save(Ok(Some(record("new-1")))).await;

    let mut wizard = wizard_on_last_step();
    let submitted = wizard.submit(&api).await.unwrap();

    assert_eq!(submitted, Submitted::Created(Some(record("new-1"))));
    assert!(!wizard.is_open());
    assert_eq!(wizard.step(), WizardStep::BasicInfo);

    let calls = api.create_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].title, "Lakeside villa");
    assert_eq!(calls[0].bedrooms, 5.0);
    assert_eq!(calls[0].bathrooms, 2.5);
    assert_eq!(calls[0].amenities, vec!["Pool"]);
    assert!(calls[0].images.is_none());
    assert!(api.update_calls().await.is_empty());
}

#[tokio::test]
async fn network_failure_keeps_draft_for_retry() {
    let api = RecordingApi::new();
    api.push_save(Err(status_error(502, "Bad Gateway"))).await;
    api.push_save(Ok(None)).await;

    let mut wizard = wizard_on_last_step();
    let err = wizard.submit(&api).await.unwrap_err();
    match err {
        WizardError::Api(api_err) => assert_eq!(api_err.to_string(), "Bad Gateway"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(wizard.is_open());
    assert_eq!(wizard.step(), WizardStep::Amenities);
    assert_eq!(wizard.draft().unwrap(), &complete_draft());

    let retried = wizard.submit(&api).await.unwrap();
    assert_eq!(retried, Submitted::Created(None));
    assert_eq!(api.create_calls().await.len(), 2);
}

#[tokio::test]
async fn final_validation_reports_every_step() {
    let api = RecordingApi::new();
    let mut wizard = wizard_on_last_step();
    {
        let draft = wizard.draft_mut().unwrap();
        draft.title.clear();
        draft.location.coordinates.lat = 123.0;
        draft.amenities.clear();
    }

    let err = wizard.submit(&api).await.unwrap_err();
    let errors = match err {
        WizardError::Invalid(errors) => errors,
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(errors.fields(), vec![Field::Title, Field::Latitude, Field::Amenities]);
    let grouped = errors.by_step();
    assert_eq!(
        grouped.keys().copied().collect::<Vec<_>>(),
        vec![WizardStep::BasicInfo, WizardStep::Location, WizardStep::Amenities]
    );
    assert_eq!(wizard.step(), WizardStep::Amenities);
    assert_eq!(wizard.errors().unwrap().len(), 3);
    assert!(api.create_calls().await.is_empty());
}

#[tokio::test]
async fn submit_requires_last_step() {
    let api = RecordingApi::new();
    let mut wizard = Wizard::new();
    wizard.open(None);
    *wizard.draft_mut().unwrap() = complete_draft();
    assert!(matches!(wizard.submit(&api).await, Err(WizardError::NotFinalStep)));

    wizard.close();
    assert!(matches!(wizard.submit(&api).await, Err(WizardError::Closed)));
    assert!(api.create_calls().await.is_empty());
}

#[tokio::test]
async fn edit_mode_updates_by_id() {
    let api = RecordingApi::new();
    let mut wizard = Wizard::new();
    wizard.open(Some(&seeded_record()));
    wizard.draft_mut().unwrap().title = "Renovated studio".into();
    wizard.toggle_amenity("Concierge").unwrap();
    for _ in 0..3 {
        wizard.advance().unwrap();
    }

    let submitted = wizard.submit(&api).await.unwrap();
    assert_eq!(
        submitted,
        Submitted::Updated {
            id: "p-42".into(),
            record: None
        }
    );
    let calls = api.update_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "p-42");
    assert_eq!(calls[0].1.title, "Renovated studio");
    assert_eq!(calls[0].1.price, 800.0);
    assert_eq!(calls[0].1.amenities, vec!["Gym Access", "Concierge"]);
    assert!(api.create_calls().await.is_empty());
}

#[tokio::test]
async fn back_and_forth_preserves_every_step() {
    let mut wizard = wizard_on_last_step();
    let before = wizard.draft().unwrap().clone();
    while wizard.step() != WizardStep::BasicInfo {
        wizard.retreat().unwrap();
    }
    for _ in 0..3 {
        wizard.advance().unwrap();
    }
    assert_eq!(wizard.draft().unwrap(), &before);
}

#[tokio::test]
async fn inquiry_is_validated_before_sending() {
    let api = RecordingApi::new();
    let form = InquiryForm {
        name: "Grace".into(),
        email: "grace@".into(),
        phone: String::new(),
        message: "Is parking included?".into(),
    };
    let err = form.submit(&api, "p-1").await.unwrap_err();
    match err {
        InquiryError::Invalid(errors) => {
            assert_eq!(errors.fields(), vec![InquiryField::Email, InquiryField::Phone])
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(api.inquiry_calls().await.is_empty());

    let form = InquiryForm {
        email: "grace@example.com".into(),
        phone: "555-0101".into(),
        ..form
    };
    form.submit(&api, "p-1").await.unwrap();
    let calls = api.inquiry_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].property_id, "p-1");
    assert_eq!(calls[0].message, "Is parking included?");
}

#[tokio::test]
async fn inquiry_transport_error_surfaces() {
    let api = RecordingApi::new();
    api.push_inquiry(Err(status_error(500, "Request failed"))).await;
    let form = InquiryForm {
        name: "Grace".into(),
        email: "grace@example.com".into(),
        phone: "555-0101".into(),
        message: String::new(),
    };
    let err = form.submit(&api, "p-1").await.unwrap_err();
    assert!(matches!(err, InquiryError::Api(_)));
    assert_eq!(err.to_string(), "Request failed");
}

fn viewing(id: &str, at: chrono::DateTime<Utc>, status: &str) -> ViewingSchedule {
    serde_json::from_value(json!({
        "id": id,
        "clientId": "c-1",
        "propertyId": "p-1",
        "status": status,
        "notes": null,
        "viewingDate": at.to_rfc3339(),
        "client": { "id": "c-1", "fullName": "Sam Lee", "email": "sam@example.com", "phone": "555" }
    }))
    .unwrap()
}

#[tokio::test]
async fn schedule_board_keeps_selected_day_only() {
    let api = RecordingApi::new();
    let day = NaiveDate::from_ymd_opt(2024, 2, 13).unwrap();
    api.set_schedules(vec![
        viewing("late", Utc.with_ymd_and_hms(2024, 2, 13, 16, 30, 0).unwrap(), "Scheduled"),
        viewing("other-day", Utc.with_ymd_and_hms(2024, 2, 14, 9, 0, 0).unwrap(), "Pending"),
        viewing("early", Utc.with_ymd_and_hms(2024, 2, 13, 10, 0, 0).unwrap(), "completed"),
    ])
    .await;

    let mut board = ScheduleBoard::new(day);
    let kept = board.load(&api).await.unwrap();

    assert_eq!(kept, 2);
    let ids: Vec<&str> = board.schedules().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "late"]);
    assert!(board.schedules()[0].notes.is_empty());
    assert_eq!(
        api.schedule_calls().await,
        vec![Utc.with_ymd_and_hms(2024, 2, 13, 0, 0, 0).unwrap()]
    );
}
