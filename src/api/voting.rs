use mongodb::bson::oid;
use rocket::{response::status::Created, serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        api::{
            results::ElectionResultsResponse,
            vote::{CastVoteRequest, VoteResponse},
        },
        Id,
    },
    rate_limit::Throttle,
    service::Voting,
};

use super::path_id;

pub fn routes() -> Vec<Route> {
    routes![cast_vote, get_results]
}

#[post("/elections/<election_id>/votes", data = "<request>", format = "json")]
async fn cast_vote(
    _throttle: Throttle,
    election_id: std::result::Result<Id, oid::Error>,
    request: Json<CastVoteRequest>,
    voting: &State<Voting>,
) -> Result<Created<Json<VoteResponse>>> {
    let election_id = path_id("electionId", election_id)?;
    let vote = voting
        .cast_vote(*request.voter_id, election_id, *request.voting_option_id)
        .await?;
    let location = format!("/api/elections/{election_id}/results");
    Ok(Created::new(location).body(Json(vote.into())))
}

#[get("/elections/<election_id>/results")]
async fn get_results(
    _throttle: Throttle,
    election_id: std::result::Result<Id, oid::Error>,
    voting: &State<Voting>,
) -> Result<Json<ElectionResultsResponse>> {
    let results = voting
        .get_results(path_id("electionId", election_id)?)
        .await?;
    Ok(Json(results.into()))
}
