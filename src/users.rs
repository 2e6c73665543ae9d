use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, HttpResponse};
use bson::{doc, to_document};
use futures::TryStreamExt;
use mongodb::Database;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::schemas::{USERS, User};

#[derive(Deserialize)]
struct Login {
    #[serde(rename = "personalId")]
    personal_id: String,
    password: String,
}

/// Update body: everything but the personal id, which rides in the path.
#[derive(Deserialize, Serialize)]
struct UserChanges {
    first_name: String,
    last_name: String,
    birthday: String,
    marital_status: String,
    password: String,
}

#[get("/user")]
async fn list_users(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    let users: Vec<User> = db
        .collection(USERS)
        .find(None, None)
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(users))
}

#[post("/user/add")]
async fn add_user(
    db: web::Data<Database>,
    user: web::Json<User>,
) -> Result<HttpResponse, ApiError> {
    let users = db.collection::<User>(USERS);
    let mut user = user.into_inner();
    let existing = users
        .find_one(doc! { "personalId": &user.personal_id }, None)
        .await?;
    if existing.is_some() {
        return Err(ApiError::UserExists);
    }

    let inserted = users.insert_one(&user, None).await?;
    user.id = inserted.inserted_id.as_object_id();
    Ok(HttpResponse::Created().json(user))
}

#[put("/user/update/{personalId}")]
async fn update_user(
    db: web::Data<Database>,
    path: web::Path<String>,
    changes: web::Json<UserChanges>,
) -> Result<HttpResponse, ApiError> {
    let users = db.collection::<User>(USERS);
    let personal_id = path.into_inner();
    let existing = users
        .find_one(doc! { "personalId": &personal_id }, None)
        .await?;
    if existing.is_none() {
        return Err(ApiError::NoSuchUser);
    }

    let mut fields = to_document(&changes.into_inner())?;
    fields.insert("personalId", personal_id.as_str());
    users
        .update_one(
            doc! { "personalId": &personal_id },
            doc! { "$set": fields },
            None,
        )
        .await?;

    // Echo whatever is stored now; the update answers 201, not 200.
    let updated = users
        .find_one(doc! { "personalId": &personal_id }, None)
        .await?;
    Ok(HttpResponse::Created().json(updated))
}

#[delete("/user/delete/{personalId}")]
async fn delete_user(
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let deleted = db
        .collection::<User>(USERS)
        .delete_one(doc! { "personalId": path.into_inner() }, None)
        .await?;
    if deleted.deleted_count == 0 {
        return Err(ApiError::UserNotFound);
    }
    Ok(HttpResponse::Ok().json("OK"))
}

#[post("/user/login")]
async fn login(
    db: web::Data<Database>,
    credentials: web::Json<Login>,
) -> Result<HttpResponse, ApiError> {
    let credentials = credentials.into_inner();
    let user = db
        .collection::<User>(USERS)
        .find_one(doc! { "personalId": &credentials.personal_id }, None)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    if user.password != credentials.password {
        return Err(ApiError::WrongPassword);
    }
    Ok(HttpResponse::Ok().json("OK"))
}

#[get("/user/resetUsers")]
async fn reset_users(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    let users = db.collection::<User>(USERS);
    users.delete_many(doc! {}, None).await?;
    users.insert_one(User::seed(), None).await?;
    Ok(HttpResponse::build(StatusCode::RESET_CONTENT).json("Reset done"))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(add_user)
        .service(update_user)
        .service(delete_user)
        .service(login)
        .service(reset_users);
}
