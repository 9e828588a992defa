use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json,
};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{ListQueueParams, SubmitSchema, ValidatedJson},
    serialized::{QueueItem, QueueView, SubmitResult, ToSerialized},
    Router,
};

#[utoipa::path(
    post,
    path = "/v1/queue",
    tag = "queue",
    request_body = SubmitSchema,
    responses(
        (status = 200, body = SubmitResult),
        (status = 400, description = "Wrong url format"),
        (status = 404, description = "Creator does not exist")
    )
)]
pub(crate) async fn submit(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<SubmitSchema>,
) -> ServerResult<Json<SubmitResult>> {
    let item = context
        .collab
        .queues
        .submit(body.creator_id, &body.url)
        .await?;

    Ok(Json(SubmitResult { id: item.id }))
}

#[utoipa::path(
    get,
    path = "/v1/queue",
    tag = "queue",
    params(
        ("creatorId" = i32, Query, description = "The creator whose queue to list")
    ),
    responses(
        (status = 200, body = QueueView),
        (status = 404, description = "Creator does not exist")
    )
)]
pub(crate) async fn list(
    State(context): State<ServerContext>,
    Query(params): Query<ListQueueParams>,
) -> ServerResult<Json<QueueView>> {
    let view = context.collab.queues.list(params.creator_id).await?;

    Ok(Json(QueueView {
        items: view.items.to_serialized(),
        now_playing: view.now_playing.map(|p| p.to_serialized()),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/queue/{id}/vote",
    tag = "queue",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Vote was recorded"),
        (status = 409, description = "Voter already voted on this item")
    )
)]
pub(crate) async fn vote(
    State(context): State<ServerContext>,
    session: Session,
    Path(item_id): Path<i32>,
) -> ServerResult<()> {
    context.collab.queues.vote(session.0.user.id, item_id).await?;

    Ok(())
}

#[utoipa::path(
    delete,
    path = "/v1/queue/{id}/vote",
    tag = "queue",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Vote was retracted"),
        (status = 404, description = "There is no vote to retract")
    )
)]
pub(crate) async fn retract_vote(
    State(context): State<ServerContext>,
    session: Session,
    Path(item_id): Path<i32>,
) -> ServerResult<()> {
    context
        .collab
        .queues
        .retract_vote(session.0.user.id, item_id)
        .await?;

    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/queue/advance",
    tag = "queue",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = QueueItem),
        (status = 404, description = "No unplayed items are left in the queue")
    )
)]
pub(crate) async fn advance(
    State(context): State<ServerContext>,
    session: Session,
) -> ServerResult<Json<QueueItem>> {
    // The advance authority is scoped to the caller's own queue
    let item = context.collab.queues.advance(session.0.user.id).await?;

    Ok(Json(item.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(submit))
        .route("/", get(list))
        .route("/advance", post(advance))
        .route("/:id/vote", post(vote))
        .route("/:id/vote", delete(retract_vote))
}
