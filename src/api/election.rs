use mongodb::bson::oid;
use rocket::{response::status::Created, serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        api::election::{
            CreateElectionRequest, CreateVotingOptionRequest, ElectionResponse,
            VotingOptionResponse,
        },
        Id,
    },
    rate_limit::Throttle,
    service::ElectionService,
};

use super::path_id;

pub fn routes() -> Vec<Route> {
    routes![create_election, get_elections, get_election, add_voting_option]
}

#[post("/elections", data = "<request>", format = "json")]
async fn create_election(
    _throttle: Throttle,
    request: Json<CreateElectionRequest>,
    elections: &State<ElectionService>,
) -> Result<Created<Json<ElectionResponse>>> {
    let election = elections.create_election(&request.name).await?;
    let location = format!("/api/elections/{}", election.id());
    Ok(Created::new(location).body(Json(election.into())))
}

#[get("/elections")]
async fn get_elections(
    _throttle: Throttle,
    elections: &State<ElectionService>,
) -> Result<Json<Vec<ElectionResponse>>> {
    let elections = elections.get_all_elections().await?;
    Ok(Json(elections.into_iter().map(Into::into).collect()))
}

#[get("/elections/<election_id>")]
async fn get_election(
    _throttle: Throttle,
    election_id: std::result::Result<Id, oid::Error>,
    elections: &State<ElectionService>,
) -> Result<Json<ElectionResponse>> {
    let election = elections
        .get_election(path_id("electionId", election_id)?)
        .await?;
    Ok(Json(election.into()))
}

#[post("/elections/<election_id>/options", data = "<request>", format = "json")]
async fn add_voting_option(
    _throttle: Throttle,
    election_id: std::result::Result<Id, oid::Error>,
    request: Json<CreateVotingOptionRequest>,
    elections: &State<ElectionService>,
) -> Result<Created<Json<VotingOptionResponse>>> {
    let election_id = path_id("electionId", election_id)?;
    let option = elections
        .add_voting_option(election_id, &request.name)
        .await?;
    let location = format!("/api/elections/{election_id}");
    Ok(Created::new(location).body(Json((&option).into())))
}
