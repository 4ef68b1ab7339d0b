//! The error catalog is part of the public contract; codes must stay stable.

use std::collections::HashSet;

use boats::errors::ErrorCode;

#[test]
fn codes_are_unique_and_versioned() {
    let mut seen = HashSet::new();
    for code in ErrorCode::ALL {
        let def = code.def();
        assert!(seen.insert(def.code), "duplicate code {}", def.code);
        assert!(def.code.starts_with("boats."), "{}", def.code);
        assert!(def.code.ends_with(".v1"), "{}", def.code);
        assert_eq!(
            def.type_url,
            format!("{}{}", ErrorCode::type_base(), def.code)
        );
    }
}

#[test]
fn statuses_match_the_contract() {
    let expected = [
        (ErrorCode::boats_trip_not_found_v1, 404),
        (ErrorCode::boats_module_not_found_v1, 404),
        (ErrorCode::boats_crew_member_not_found_v1, 404),
        (ErrorCode::boats_crew_forbidden_v1, 403),
        (ErrorCode::boats_crew_invalid_email_v1, 400),
        (ErrorCode::boats_crew_duplicate_invite_v1, 422),
        (ErrorCode::boats_request_validation_v1, 422),
        (ErrorCode::boats_request_conflict_v1, 409),
        (ErrorCode::boats_identity_unauthenticated_v1, 401),
        (ErrorCode::boats_identity_upstream_v1, 502),
        (ErrorCode::boats_internal_database_v1, 500),
    ];
    assert_eq!(expected.len(), ErrorCode::ALL.len());
    for (code, status) in expected {
        assert_eq!(code.status(), status, "{code:?}");
    }
}

#[test]
fn problem_carries_catalog_fields() {
    let problem = ErrorCode::boats_trip_not_found_v1.to_problem("Trip was not found");
    assert_eq!(problem.status, 404);
    assert_eq!(problem.title, "Trip Not Found");
    assert_eq!(problem.code, "boats.trip.not_found.v1");
    assert_eq!(problem.detail, "Trip was not found");
    assert_eq!(
        problem.type_url,
        "https://errors.sailbow.app/boats.trip.not_found.v1"
    );
}

#[test]
fn response_sets_instance_and_trace() {
    let response = ErrorCode::boats_crew_forbidden_v1.to_response(
        "only the captain may delete trips",
        "/trips/1",
        Some("trace-1".into()),
    );
    assert_eq!(response.0.instance, "/trips/1");
    assert_eq!(response.0.trace_id.as_deref(), Some("trace-1"));
    assert_eq!(response.0.status, 403);
}
