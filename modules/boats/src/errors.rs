//! Error catalog: every stable error code the boats REST surface can return.

use problem::{ErrDef, Problem, ProblemResponse};

macro_rules! type_base {
    () => {
        "https://errors.sailbow.app/"
    };
}

const TYPE_BASE: &str = type_base!();

macro_rules! catalog {
    ($($variant:ident => ($status:literal, $title:literal, $code:literal)),+ $(,)?) => {
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $($variant),+
        }

        impl ErrorCode {
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$variant),+];

            pub const fn def(self) -> ErrDef {
                match self {
                    $(ErrorCode::$variant => ErrDef {
                        status: $status,
                        title: $title,
                        code: $code,
                        type_url: concat!(type_base!(), $code),
                    }),+
                }
            }
        }
    };
}

catalog! {
    boats_trip_not_found_v1 => (404, "Trip Not Found", "boats.trip.not_found.v1"),
    boats_module_not_found_v1 => (404, "Module Not Found", "boats.module.not_found.v1"),
    boats_crew_member_not_found_v1 => (404, "Crew Member Not Found", "boats.crew.not_found.v1"),
    boats_crew_forbidden_v1 => (403, "Captain Only", "boats.crew.forbidden.v1"),
    boats_crew_invalid_email_v1 => (400, "Invalid Email", "boats.crew.invalid_email.v1"),
    boats_crew_duplicate_invite_v1 => (422, "Duplicate Invite", "boats.crew.duplicate_invite.v1"),
    boats_request_validation_v1 => (422, "Validation Error", "boats.request.validation.v1"),
    boats_request_conflict_v1 => (409, "Conflict", "boats.request.conflict.v1"),
    boats_identity_unauthenticated_v1 => (401, "Unauthenticated", "boats.identity.unauthenticated.v1"),
    boats_identity_upstream_v1 => (502, "Identity Provider Error", "boats.identity.upstream.v1"),
    boats_internal_database_v1 => (500, "Internal Error", "boats.internal.database.v1"),
}

impl ErrorCode {
    pub fn status(self) -> u16 {
        self.def().status
    }

    pub fn to_problem(self, detail: impl Into<String>) -> Problem {
        self.def().to_problem(detail)
    }

    pub fn to_response(
        self,
        detail: impl Into<String>,
        instance: &str,
        trace_id: Option<String>,
    ) -> ProblemResponse {
        self.def().to_response(detail, instance, trace_id)
    }

    /// Base URI all problem `type` links share.
    pub const fn type_base() -> &'static str {
        TYPE_BASE
    }
}
