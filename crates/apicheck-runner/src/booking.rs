//! Booking contract suite
//!
//! Scenario groups for the restful-booker wire contract: read paths over
//! existing bookings and the authenticated mutation cycle. Ids are always
//! discovered from the live listing, never hard-coded, so the suite holds
//! up against whatever data the remote currently carries.

use serde_json::{Value, json};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use apicheck_core::{StatusClass, StatusExpectation, expect_partial_match};

use crate::fixture::{BOOKING_ID, MAX_BOOKING_ID, ScopedState, TOKEN};
use crate::http::Call;
use crate::scenario::{Group, RunEnv, SetupFailure, SetupScope};

/// Keys every booking object must carry.
pub const REQUIRED_BOOKING_KEYS: &[&str] = &[
    "firstname",
    "lastname",
    "totalprice",
    "depositpaid",
    "bookingdates",
];

/// The canonical create payload.
#[must_use]
pub fn booking_payload() -> Value {
    json!({
        "firstname": "Huy",
        "lastname": "Tran",
        "totalprice": 140,
        "depositpaid": false,
        "bookingdates": {
            "checkin": "2025-01-01",
            "checkout": "2025-02-01"
        },
        "additionalneeds": "Dinner"
    })
}

/// A full replacement payload, distinct in every field.
#[must_use]
pub fn updated_booking_payload() -> Value {
    json!({
        "firstname": "Huy UPDATED",
        "lastname": "Tran UPDATED",
        "totalprice": 250,
        "depositpaid": true,
        "bookingdates": {
            "checkin": "2025-03-01",
            "checkout": "2025-04-01"
        },
        "additionalneeds": "Breakfast"
    })
}

/// Attach the remote's token cookie to a call.
#[must_use]
pub fn with_token(call: Call, token: &str) -> Call {
    call.header("Cookie", format!("token={token}"))
}

/// Extract `bookingid` values from a listing body.
#[must_use]
pub fn booking_ids(listing: &Value) -> Vec<i64> {
    listing
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("bookingid").and_then(Value::as_i64))
                .collect()
        })
        .unwrap_or_default()
}

/// List bookings and pick a random existing id into state.
///
/// Also records the highest listed id, so negative scenarios can derive
/// an id that is guaranteed absent.
///
/// # Errors
///
/// Fails when the listing is not a 200, has no JSON body, or is empty —
/// every dependent scenario is then skipped.
pub fn listing_setup(env: &RunEnv, state: &mut ScopedState) -> Result<(), SetupFailure> {
    let resp = env.client.call(&Call::get("/booking"))?;
    if resp.status != 200 {
        return Err(SetupFailure(format!(
            "GET /booking returned {}",
            resp.status
        )));
    }
    let body = resp
        .body
        .ok_or_else(|| SetupFailure("GET /booking returned no JSON body".into()))?;
    let ids = booking_ids(&body);
    if ids.is_empty() {
        return Err(SetupFailure("booking listing is empty".into()));
    }

    let mut rng = SmallRng::from_entropy();
    let pick = ids[rng.gen_range(0..ids.len())];
    let max = ids.iter().copied().max().unwrap_or(pick);
    state.put(BOOKING_ID, pick);
    state.put(MAX_BOOKING_ID, max);
    Ok(())
}

/// Create a booking and authenticate; shared by the whole mutation group.
///
/// # Errors
///
/// Fails when the create or auth call does not behave as documented; the
/// group's scenarios are then skipped rather than failed.
pub fn mutation_setup(env: &RunEnv, state: &mut ScopedState) -> Result<(), SetupFailure> {
    let resp = env
        .client
        .call(&Call::post("/booking").json(booking_payload()))?;
    if resp.status != 200 {
        return Err(SetupFailure(format!(
            "POST /booking returned {}",
            resp.status
        )));
    }
    let body = resp
        .body
        .ok_or_else(|| SetupFailure("POST /booking returned no JSON body".into()))?;
    let id = body
        .get("bookingid")
        .and_then(Value::as_i64)
        .ok_or_else(|| SetupFailure("create response has no bookingid".into()))?;
    let created = body
        .get("booking")
        .ok_or_else(|| SetupFailure("create response has no booking object".into()))?;
    if let Err(e) = expect_partial_match(created, &booking_payload()) {
        return Err(SetupFailure(format!(
            "created booking does not round-trip the payload: {e}"
        )));
    }
    state.put(BOOKING_ID, id);

    let auth = env.client.call(
        &Call::post("/auth").json(json!({
            "username": env.username,
            "password": env.password,
        })),
    )?;
    if auth.status != 200 {
        return Err(SetupFailure(format!("POST /auth returned {}", auth.status)));
    }
    let token = auth
        .body
        .as_ref()
        .and_then(|b| b.get("token"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SetupFailure("auth response has no token".into()))?;
    state.put(TOKEN, token);
    Ok(())
}

/// Read-path scenarios over whatever bookings the remote already holds.
#[must_use]
pub fn read_group() -> Group {
    Group::new("read", SetupScope::PerScenario)
        .setup(listing_setup)
        .scenario("detail_has_required_keys", |ctx| {
            let id = ctx.state.get_i64(BOOKING_ID)?;
            let resp = ctx.call(&Call::get(format!("/booking/{id}")))?;
            ctx.check_status(&resp, StatusExpectation::Exact(200));
            if let Some(body) = ctx.require_body(&resp) {
                ctx.check_keys(body, REQUIRED_BOOKING_KEYS);
            }
            Ok(())
        })
        .scenario("detail_fetch_is_idempotent", |ctx| {
            let id = ctx.state.get_i64(BOOKING_ID)?;
            let first = ctx.call(&Call::get(format!("/booking/{id}")))?;
            let second = ctx.call(&Call::get(format!("/booking/{id}")))?;
            ctx.check_status(&first, StatusExpectation::Exact(200));
            ctx.check_status(&second, StatusExpectation::Exact(200));
            if let (Some(a), Some(b)) = (first.body.clone(), second.body.clone()) {
                ctx.check_partial(&b, &a);
                ctx.check_partial(&a, &b);
            }
            Ok(())
        })
        .scenario("filter_by_name_returns_array", |ctx| {
            let id = ctx.state.get_i64(BOOKING_ID)?;
            let detail = ctx.call(&Call::get(format!("/booking/{id}")))?;
            ctx.check_status(&detail, StatusExpectation::Exact(200));
            let Some(body) = ctx.require_body(&detail) else {
                return Ok(());
            };
            let firstname = body
                .get("firstname")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let lastname = body
                .get("lastname")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let resp = ctx.call(
                &Call::get("/booking")
                    .query("firstname", firstname)
                    .query("lastname", lastname),
            )?;
            ctx.check_status(&resp, StatusExpectation::Exact(200));
            if let Some(list) = resp.body.clone() {
                ctx.check_non_empty(&list);
            }
            Ok(())
        })
}

/// Authenticated mutation cycle over a booking this suite created itself.
#[must_use]
pub fn mutation_group() -> Group {
    Group::new("mutation", SetupScope::Group)
        .setup(mutation_setup)
        .scenario("put_full_update_reflected", |ctx| {
            let id = ctx.state.get_i64(BOOKING_ID)?;
            let token = ctx.state.get_str(TOKEN)?.to_string();
            let payload = updated_booking_payload();
            let resp = ctx.call(&with_token(
                Call::put(format!("/booking/{id}")).json(payload.clone()),
                &token,
            ))?;
            ctx.check_status(&resp, StatusExpectation::Exact(200));
            if let Some(body) = resp.body.clone() {
                ctx.check_partial(&body, &payload);
                ctx.check_keys(&body, REQUIRED_BOOKING_KEYS);
            }
            Ok(())
        })
        .scenario("patch_partial_keeps_unrelated_fields", |ctx| {
            let id = ctx.state.get_i64(BOOKING_ID)?;
            let token = ctx.state.get_str(TOKEN)?.to_string();
            let resp = ctx.call(&with_token(
                Call::patch(format!("/booking/{id}")).json(json!({"firstname": "Huy PATCHED"})),
                &token,
            ))?;
            ctx.check_status(&resp, StatusExpectation::Exact(200));
            if let Some(body) = resp.body.clone() {
                ctx.check_partial(&body, &json!({"firstname": "Huy PATCHED"}));
                ctx.check_keys(&body, REQUIRED_BOOKING_KEYS);
            }
            Ok(())
        })
        .scenario("delete_then_fetch_not_found", |ctx| {
            // Deletes a booking created here, not the group's shared one,
            // so sibling scenarios keep a live id whatever the run order.
            let token = ctx.state.get_str(TOKEN)?.to_string();
            let create = ctx.call(&Call::post("/booking").json(booking_payload()))?;
            ctx.check_status(&create, StatusExpectation::Exact(200));
            let Some(body) = ctx.require_body(&create) else {
                return Ok(());
            };
            let Some(id) = body.get("bookingid").and_then(Value::as_i64) else {
                return Err(crate::fixture::StateError::NotFound("bookingid".into()).into());
            };

            // The remote answers 201 Created to DELETE; assert the class,
            // not the exact code.
            let delete = ctx.call(&with_token(Call::delete(format!("/booking/{id}")), &token))?;
            ctx.check_status(&delete, StatusExpectation::Class(StatusClass::Success));

            let fetch = ctx.call(&Call::get(format!("/booking/{id}")))?;
            ctx.check_status(&fetch, StatusExpectation::NotSuccess);
            Ok(())
        })
}
