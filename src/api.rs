//! JSON-over-HTTP front for the store. Every handler takes the store lock
//! once, so each request is one serialised read-modify-write.

use actix_web::{get, http::StatusCode, post, put, web, HttpRequest, HttpResponse, ResponseError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::balance::summary_for;
use crate::claims::{claim_status, my_cost, remaining, unit_price, ClaimChange};
use crate::error::StoreError;
use crate::exchange::exchanges_for_group;
use crate::schemas::{GroupId, ItemId, NewItem, SessionId, SharedItem, UserId};
use crate::session::Session;
use crate::store::{JoinOutcome, SharedStore, Store};

pub const SESSION_HEADER: &str = "x-session-id";

type ApiResult = Result<HttpResponse, StoreError>;

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NoActiveUser | StoreError::UnknownUser(_) => StatusCode::UNAUTHORIZED,
            StoreError::NotAMember { .. } => StatusCode::FORBIDDEN,
            StoreError::UnknownGroup(_) => StatusCode::NOT_FOUND,
            StoreError::InviteCodeExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            err if err.is_validation() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn session_from(request: &HttpRequest, store: &Store) -> Result<Session, StoreError> {
    let session_id = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| SessionId::new(value.trim()))
        .ok_or(StoreError::NoActiveUser)?;
    Ok(store.resume(session_id))
}

// Reads a group the session user belongs to
fn member_group(store: &Store, session: &Session, group_id: &GroupId) -> Result<UserId, StoreError> {
    let user = session.require_user()?;
    let group = store
        .group(group_id)
        .ok_or_else(|| StoreError::UnknownGroup(group_id.clone()))?;
    if !group.has_member(user) {
        return Err(StoreError::NotAMember {
            user: user.clone(),
            group: group_id.clone(),
        });
    }
    Ok(user.clone())
}

// Same check for the group an item was posted to. `None` when the item does
// not exist; the caller still needs a logged-in session either way.
fn item_member(
    store: &Store,
    session: &Session,
    item_id: &ItemId,
) -> Result<Option<UserId>, StoreError> {
    match store.item(item_id) {
        Some(item) => member_group(store, session, &item.group_id).map(Some),
        None => session.require_user().map(|_| None),
    }
}

fn unknown_item(item_id: &ItemId) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody {
        error: format!("Unknown item: {item_id}"),
    })
}

#[derive(Deserialize, Serialize)]
struct LoginJson {
    name: String,
}

#[derive(Deserialize, Serialize)]
struct LoginResponse {
    session_id: SessionId,
    user_id: UserId,
}

#[post("/sessions")]
async fn login(store: web::Data<SharedStore>, json: web::Json<LoginJson>) -> ApiResult {
    let name = json.into_inner().name;
    if name.trim().is_empty() {
        return Err(StoreError::EmptyField("name"));
    }
    let mut session = Session::new();
    let user_id = store.write(|store| store.login(&mut session, name.trim()));
    Ok(HttpResponse::Ok().json(LoginResponse {
        session_id: session.id().clone(),
        user_id,
    }))
}

#[derive(Deserialize, Serialize)]
struct GroupNameJson {
    name: String,
}

#[derive(Deserialize, Serialize)]
struct InviteCodeJson {
    invite_code: String,
}

#[get("/groups")]
async fn list_groups(store: web::Data<SharedStore>, request: HttpRequest) -> ApiResult {
    store.read(|store| {
        let session = session_from(&request, store)?;
        let user = session.require_user()?;
        let groups: Vec<_> = store.groups_for(user).collect();
        Ok(HttpResponse::Ok().json(groups))
    })
}

#[post("/groups")]
async fn create_group(
    store: web::Data<SharedStore>,
    request: HttpRequest,
    json: web::Json<GroupNameJson>,
) -> ApiResult {
    store.write(|store| {
        let session = session_from(&request, store)?;
        let group_id = store.create_group(&session, &json.name)?;
        Ok(HttpResponse::Created().json(store.group(&group_id)))
    })
}

#[post("/groups/join")]
async fn join_group(
    store: web::Data<SharedStore>,
    request: HttpRequest,
    json: web::Json<InviteCodeJson>,
) -> ApiResult {
    store.write(|store| {
        let session = session_from(&request, store)?;
        let outcome = store.join_group(&session, &json.invite_code)?;
        Ok(HttpResponse::Ok().json(JoinResponse::from(outcome)))
    })
}

#[derive(Deserialize, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum JoinResponse {
    Joined { group_id: GroupId },
    AlreadyMember { group_id: GroupId },
    NoMatch,
}

impl From<JoinOutcome> for JoinResponse {
    fn from(outcome: JoinOutcome) -> Self {
        match outcome {
            JoinOutcome::Joined(group_id) => JoinResponse::Joined { group_id },
            JoinOutcome::AlreadyMember(group_id) => JoinResponse::AlreadyMember { group_id },
            JoinOutcome::NoMatch => JoinResponse::NoMatch,
        }
    }
}

/// An item as the front end sees it, with the derived figures alongside.
#[derive(Serialize)]
struct ItemView<'a> {
    #[serde(flatten)]
    item: &'a SharedItem,
    remaining: i64,
    unit_price: f64,
    my_cost: f64,
    status: &'static str,
}

impl<'a> ItemView<'a> {
    fn new(item: &'a SharedItem, viewer: &UserId) -> Result<Self, StoreError> {
        Ok(Self {
            item,
            remaining: remaining(item),
            unit_price: unit_price(item)?,
            my_cost: my_cost(item, viewer)?,
            status: claim_status(item).label(),
        })
    }
}

#[derive(Deserialize, Serialize)]
struct ItemForm {
    name: String,
    total_price: f64,
    total_quantity: i64,
    #[serde(default)]
    unit_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    expires_on: Option<NaiveDate>,
}

impl ItemForm {
    fn into_new_item(self, group_id: GroupId, created_by: UserId) -> NewItem {
        let mut item = NewItem::new(
            group_id,
            created_by,
            self.name,
            self.total_price,
            self.total_quantity,
        );
        if let Some(unit_name) = self.unit_name {
            item = item.with_unit_name(unit_name);
        }
        item.photo_url = self.photo_url;
        item.notes = self.notes;
        item.source = self.source;
        item.expires_on = self.expires_on;
        item
    }
}

#[get("/groups/{id}/items")]
async fn list_items(
    store: web::Data<SharedStore>,
    request: HttpRequest,
    id: web::Path<String>,
) -> ApiResult {
    let group_id = GroupId::new(id.into_inner());
    store.read(|store| {
        let session = session_from(&request, store)?;
        let viewer = member_group(store, &session, &group_id)?;
        let items = store
            .items_for_group(&group_id)
            .map(|item| ItemView::new(item, &viewer))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HttpResponse::Ok().json(items))
    })
}

#[post("/groups/{id}/items")]
async fn add_item(
    store: web::Data<SharedStore>,
    request: HttpRequest,
    id: web::Path<String>,
    form: web::Json<ItemForm>,
) -> ApiResult {
    let group_id = GroupId::new(id.into_inner());
    store.write(|store| {
        let session = session_from(&request, store)?;
        let creator = session.require_user()?.clone();
        let item_id = store.add_item(form.into_inner().into_new_item(group_id, creator.clone()))?;
        match store.item(&item_id) {
            Some(item) => Ok(HttpResponse::Created().json(ItemView::new(item, &creator)?)),
            None => Ok(HttpResponse::InternalServerError().finish()),
        }
    })
}

#[post("/groups/{id}/items/batch")]
async fn add_items(
    store: web::Data<SharedStore>,
    request: HttpRequest,
    id: web::Path<String>,
    forms: web::Json<Vec<ItemForm>>,
) -> ApiResult {
    let group_id = GroupId::new(id.into_inner());
    store.write(|store| {
        let session = session_from(&request, store)?;
        let creator = session.require_user()?.clone();
        let drafts = forms
            .into_inner()
            .into_iter()
            .map(|form| form.into_new_item(group_id.clone(), creator.clone()))
            .collect();
        let ids = store.add_items(drafts)?;
        Ok(HttpResponse::Created().json(ids))
    })
}

#[derive(Deserialize, Serialize)]
struct ClaimJson {
    quantity: u32,
}

#[put("/items/{id}/claim")]
async fn toggle_claim(
    store: web::Data<SharedStore>,
    request: HttpRequest,
    id: web::Path<String>,
    json: web::Json<ClaimJson>,
) -> ApiResult {
    let item_id = ItemId::new(id.into_inner());
    store.write(|store| {
        let session = session_from(&request, store)?;
        let Some(user) = item_member(store, &session, &item_id)? else {
            return Ok(HttpResponse::Ok().json(ClaimChange::ItemMissing));
        };
        let change = store.toggle_claim(&item_id, &user, json.quantity);
        Ok(HttpResponse::Ok().json(change))
    })
}

#[derive(Deserialize, Serialize)]
struct CommentJson {
    text: String,
}

#[post("/items/{id}/comments")]
async fn add_comment(
    store: web::Data<SharedStore>,
    request: HttpRequest,
    id: web::Path<String>,
    json: web::Json<CommentJson>,
) -> ApiResult {
    let item_id = ItemId::new(id.into_inner());
    store.write(|store| {
        let session = session_from(&request, store)?;
        if item_member(store, &session, &item_id)?.is_none() {
            return Ok(unknown_item(&item_id));
        }
        match store.add_comment(&session, &item_id, &json.text)? {
            Some(comment_id) => Ok(HttpResponse::Created().json(comment_id)),
            None => Ok(unknown_item(&item_id)),
        }
    })
}

#[get("/items/{id}/comments")]
async fn list_comments(
    store: web::Data<SharedStore>,
    request: HttpRequest,
    id: web::Path<String>,
) -> ApiResult {
    let item_id = ItemId::new(id.into_inner());
    store.read(|store| {
        let session = session_from(&request, store)?;
        if item_member(store, &session, &item_id)?.is_none() {
            return Ok(unknown_item(&item_id));
        }
        let comments: Vec<_> = store.comments_for(&item_id).collect();
        Ok(HttpResponse::Ok().json(comments))
    })
}

#[get("/groups/{id}/balance")]
async fn get_balance(
    store: web::Data<SharedStore>,
    request: HttpRequest,
    id: web::Path<String>,
) -> ApiResult {
    let group_id = GroupId::new(id.into_inner());
    store.read(|store| {
        let session = session_from(&request, store)?;
        let user = member_group(store, &session, &group_id)?;
        Ok(HttpResponse::Ok().json(summary_for(store.state(), &group_id, &user)))
    })
}

#[get("/groups/{id}/exchanges")]
async fn get_exchanges(
    store: web::Data<SharedStore>,
    request: HttpRequest,
    id: web::Path<String>,
) -> ApiResult {
    let group_id = GroupId::new(id.into_inner());
    store.read(|store| {
        let session = session_from(&request, store)?;
        member_group(store, &session, &group_id)?;
        Ok(HttpResponse::Ok().json(exchanges_for_group(store.state(), &group_id)))
    })
}

/// Registers every endpoint. The caller provides the `SharedStore` app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(list_groups)
        .service(join_group)
        .service(create_group)
        .service(list_items)
        .service(add_items)
        .service(add_item)
        .service(toggle_claim)
        .service(add_comment)
        .service(list_comments)
        .service(get_balance)
        .service(get_exchanges);
}
