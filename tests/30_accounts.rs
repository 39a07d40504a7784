mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// A registry entry that cannot be written takes the login account down with it,
/// so the admin can resubmit the same email once the roll number is fixed.
#[tokio::test]
async fn rejected_student_entry_leaves_no_account_behind() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let admin = common::admin_token(server).await?;
    let suffix = common::unique_suffix();

    let res = client
        .post(server.url("/api/vendors"))
        .bearer_auth(&admin)
        .json(&json!({ "name": format!("Kiosk {suffix}"), "location": "Library" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let vendor_id = res.json::<Value>().await?["data"]["id"]
        .as_str()
        .context("vendor id")?
        .to_string();

    let create = |email: String, roll_no: String| {
        client
            .post(server.url("/api/auth/create-user"))
            .bearer_auth(&admin)
            .json(&json!({
                "name": "Student",
                "email": email,
                "password": "student-password",
                "role": "student",
                "vendorId": vendor_id,
                "rollNo": roll_no,
            }))
            .send()
    };

    let taken_roll = format!("T{suffix}");
    let res = create(format!("first-{suffix}@inst.edu"), taken_roll.clone()).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let second = format!("second-{suffix}@inst.edu");
    let res = create(second.clone(), taken_roll).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = create(second.clone(), format!("F{suffix}")).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["user"]["email"], second.as_str());
    assert_eq!(body["data"]["student"]["rollNo"], format!("F{suffix}"));

    Ok(())
}
