use mongodb::bson::oid;
use rocket::{response::status::Created, serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        api::voter::{CreateVoterRequest, VoterResponse},
        Id,
    },
    rate_limit::Throttle,
    service::VoterService,
};

use super::path_id;

pub fn routes() -> Vec<Route> {
    routes![create_voter, get_voters, get_voter, block_voter, unblock_voter]
}

#[post("/voters", data = "<request>", format = "json")]
async fn create_voter(
    _throttle: Throttle,
    request: Json<CreateVoterRequest>,
    voters: &State<VoterService>,
) -> Result<Created<Json<VoterResponse>>> {
    let voter = voters.create_voter(&request.name, &request.email).await?;
    let location = format!("/api/voters/{}", voter.id());
    Ok(Created::new(location).body(Json(voter.into())))
}

#[get("/voters")]
async fn get_voters(
    _throttle: Throttle,
    voters: &State<VoterService>,
) -> Result<Json<Vec<VoterResponse>>> {
    let voters = voters.get_all_voters().await?;
    Ok(Json(voters.into_iter().map(Into::into).collect()))
}

#[get("/voters/<voter_id>")]
async fn get_voter(
    _throttle: Throttle,
    voter_id: std::result::Result<Id, oid::Error>,
    voters: &State<VoterService>,
) -> Result<Json<VoterResponse>> {
    let voter = voters.get_voter(path_id("voterId", voter_id)?).await?;
    Ok(Json(voter.into()))
}

#[patch("/voters/<voter_id>/block")]
async fn block_voter(
    _throttle: Throttle,
    voter_id: std::result::Result<Id, oid::Error>,
    voters: &State<VoterService>,
) -> Result<Json<VoterResponse>> {
    let voter = voters.block_voter(path_id("voterId", voter_id)?).await?;
    Ok(Json(voter.into()))
}

#[patch("/voters/<voter_id>/unblock")]
async fn unblock_voter(
    _throttle: Throttle,
    voter_id: std::result::Result<Id, oid::Error>,
    voters: &State<VoterService>,
) -> Result<Json<VoterResponse>> {
    let voter = voters.unblock_voter(path_id("voterId", voter_id)?).await?;
    Ok(Json(voter.into()))
}
