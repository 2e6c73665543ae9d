use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, HttpResponse};
use bson::oid::ObjectId;
use bson::{doc, to_document};
use chrono::NaiveDate;
use futures::TryStreamExt;
use mongodb::Database;
use tokio::sync::Mutex;
use tracing::warn;

use crate::approximation::{average_sum, ApproximateAverage};
use crate::average;
use crate::error::ApiError;
use crate::schemas::{COSTS, COST_AVERAGES, Cost, CostAverage};

#[post("/cost/add")]
async fn add_cost(
    db: web::Data<Database>,
    cost: web::Json<Cost>,
) -> Result<HttpResponse, ApiError> {
    let mut cost = cost.into_inner();

    // A failed aggregate update is logged and the cost is stored anyway, so
    // the two can drift apart.
    let maintained =
        average::record_cost(db.get_ref(), cost.date, cost.sum, &cost.user_id).await;
    if let Err(err) = maintained {
        warn!(error = %err, user_id = %cost.user_id, "monthly average update failed");
    }

    let inserted = db.collection::<Cost>(COSTS).insert_one(&cost, None).await?;
    cost.id = inserted.inserted_id.as_object_id();
    Ok(HttpResponse::Created().json(cost))
}

#[get("/cost/{userId}")]
async fn get_costs(
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let costs: Vec<Cost> = db
        .collection(COSTS)
        .find(doc! { "userId": path.into_inner() }, None)
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(costs))
}

#[get("/cost/report/{fromDate}/{toDate}")]
async fn costs_report(
    db: web::Data<Database>,
    range: web::Path<(NaiveDate, NaiveDate)>,
) -> Result<HttpResponse, ApiError> {
    let (from, to) = range.into_inner();
    // Half-open range: costs dated `to` itself are excluded.
    let filter = doc! { "date": { "$gte": from.to_string(), "$lt": to.to_string() } };
    let costs: Vec<Cost> = db
        .collection(COSTS)
        .find(filter, None)
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(costs))
}

#[put("/cost/update/{costId}")]
async fn update_cost(
    db: web::Data<Database>,
    path: web::Path<String>,
    changes: web::Json<Cost>,
) -> Result<HttpResponse, ApiError> {
    let costs = db.collection::<Cost>(COSTS);
    let id = ObjectId::parse_str(path.into_inner())?;

    let mut changes = changes.into_inner();
    changes.id = None;
    costs
        .update_one(
            doc! { "_id": id },
            doc! { "$set": to_document(&changes)? },
            None,
        )
        .await?;

    // Re-read and echo as an array; a miss comes back as an empty one.
    let updated: Vec<Cost> = costs
        .find(doc! { "_id": id }, None)
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/cost/delete/{costId}")]
async fn delete_cost(
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = ObjectId::parse_str(path.into_inner())?;
    db.collection::<Cost>(COSTS)
        .delete_one(doc! { "_id": id }, None)
        .await?;
    Ok(HttpResponse::Ok().json("OK"))
}

#[get("/cost/average/{userId}")]
async fn monthly_averages(
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let rows: Vec<CostAverage> = db
        .collection(COST_AVERAGES)
        .find(doc! { "userId": path.into_inner() }, None)
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/cost/expensesApproximationAverage/{userId}")]
async fn approximate_average(
    db: web::Data<Database>,
    cache: web::Data<Mutex<ApproximateAverage>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    if let Some(cached) = cache.lock().await.poll() {
        return Ok(HttpResponse::Ok().json(cached));
    }

    // Refresh due: recompute over every stored cost of the requested user.
    // The lock is not held during the fetch, so calls landing in this window
    // also see the refresh as due and recompute.
    let costs: Vec<Cost> = db
        .collection(COSTS)
        .find(doc! { "userId": path.into_inner() }, None)
        .await?
        .try_collect()
        .await?;
    let fresh = cache.lock().await.refresh(average_sum(&costs));
    Ok(HttpResponse::Ok().json(fresh))
}

#[get("/cost/resetCost/{userId}")]
async fn reset_costs(
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    // Only the costs go; the monthly averages stay behind.
    db.collection::<Cost>(COSTS)
        .delete_many(doc! { "userId": path.into_inner() }, None)
        .await?;
    Ok(HttpResponse::build(StatusCode::RESET_CONTENT).json("Reset done"))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(reset_costs)
        .service(monthly_averages)
        .service(get_costs)
        .service(costs_report)
        .service(approximate_average)
        .service(update_cost)
        .service(delete_cost)
        .service(add_cost);
}
