//! Task endpoints: list with FSP, multipart create, update, delete,
//! document download.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;

use taskhub_api::auth::Ack;
use taskhub_api::query::{TaskQuery, TaskSort};
use taskhub_api::task::{
    DOCUMENT_CONTENT_TYPE, Document, MAX_TASK_DOCUMENTS, Pagination, Task, TaskFields, TaskId,
    TaskListResponse, TaskPriority, TaskStatus,
};
use taskhub_api::user::UserId;

use crate::auth::{ApiFailure, failure};
use crate::state::{Claims, ServerState, StoredDocument, mint_id};

/// `GET /tasks` — filtered, sorted, paginated listing.
///
/// Non-admin callers only see tasks assigned to them; admins see
/// everything. Pagination metadata is computed here and nowhere else —
/// clients take it verbatim.
pub async fn list(
    claims: Claims,
    State(state): State<Arc<ServerState>>,
    Query(query): Query<TaskQuery>,
) -> Json<TaskListResponse> {
    let tasks = state.tasks.read().await;

    let mut matching: Vec<Task> = tasks
        .values()
        .filter(|t| query.status.is_none_or(|s| t.status == s))
        .filter(|t| query.priority.is_none_or(|p| t.priority == p))
        .filter(|t| claims.is_admin() || t.assigned_to == claims.user_id)
        .cloned()
        .collect();
    drop(tasks);

    sort_tasks(&mut matching, query.sort);

    let limit = u64::from(query.limit.max(1));
    let page = u64::from(query.page.max(1));
    let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
    let total_pages = total.div_ceil(limit);

    let start = usize::try_from((page - 1) * limit).unwrap_or(usize::MAX);
    let page_tasks: Vec<Task> = matching
        .into_iter()
        .skip(start)
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();

    Json(TaskListResponse {
        tasks: page_tasks,
        pagination: Pagination {
            total_tasks: total,
            current_page: query.page.max(1),
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            page_size: query.limit.max(1),
        },
    })
}

fn sort_tasks(tasks: &mut [Task], sort: TaskSort) {
    match sort {
        TaskSort::DueDateDesc => tasks.sort_by(|a, b| b.due_date.cmp(&a.due_date)),
        TaskSort::DueDateAsc => tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
        TaskSort::PriorityDesc => tasks.sort_by(|a, b| b.priority.cmp(&a.priority)),
        TaskSort::Status => tasks.sort_by(|a, b| a.status.cmp(&b.status)),
    }
}

/// Accumulates the multipart fields of a create request.
#[derive(Default)]
struct CreateForm {
    title: Option<String>,
    description: String,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: Option<NaiveDate>,
    assigned_to: Option<String>,
    documents: Vec<(String, Vec<u8>)>,
}

/// Parses one enum-ish field by round-tripping through its JSON string
/// form, so the wire labels stay defined in exactly one place.
fn parse_wire<T: serde::de::DeserializeOwned>(label: &str, raw: &str) -> Result<T, ApiFailure> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| failure(StatusCode::BAD_REQUEST, format!("Invalid {label}: {raw}")))
}

async fn read_create_form(mut multipart: Multipart) -> Result<CreateForm, ApiFailure> {
    let mut form = CreateForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        failure(
            StatusCode::BAD_REQUEST,
            format!("Malformed multipart body: {e}"),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "documents" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                if content_type != DOCUMENT_CONTENT_TYPE {
                    return Err(failure(
                        StatusCode::BAD_REQUEST,
                        "Only PDF documents are allowed",
                    ));
                }
                let file_name = field.file_name().unwrap_or("document.pdf").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    failure(StatusCode::BAD_REQUEST, format!("Upload aborted: {e}"))
                })?;
                form.documents.push((file_name, bytes.to_vec()));
            }
            _ => {
                let value = field.text().await.map_err(|e| {
                    failure(StatusCode::BAD_REQUEST, format!("Malformed field: {e}"))
                })?;
                match name.as_str() {
                    "title" => form.title = Some(value),
                    "description" => form.description = value,
                    "status" => form.status = Some(parse_wire("status", &value)?),
                    "priority" => form.priority = Some(parse_wire("priority", &value)?),
                    "due_date" => {
                        form.due_date = Some(value.parse().map_err(|_| {
                            failure(
                                StatusCode::BAD_REQUEST,
                                format!("Invalid due_date: {value}"),
                            )
                        })?);
                    }
                    "assigned_to" => {
                        if !value.is_empty() {
                            form.assigned_to = Some(value);
                        }
                    }
                    // Unknown fields are ignored, as the original does.
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

/// `POST /tasks` — multipart create with up to three PDF documents.
pub async fn create(
    claims: Claims,
    State(state): State<Arc<ServerState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Task>), ApiFailure> {
    let form = read_create_form(multipart).await?;

    let Some(title) = form.title.filter(|t| !t.is_empty()) else {
        return Err(failure(StatusCode::BAD_REQUEST, "Title is required"));
    };
    let Some(due_date) = form.due_date else {
        return Err(failure(StatusCode::BAD_REQUEST, "Due date is required"));
    };
    if form.documents.len() > MAX_TASK_DOCUMENTS {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            format!("Only up to {MAX_TASK_DOCUMENTS} documents are allowed"),
        ));
    }

    let task_id = TaskId::new(mint_id());
    let mut attached_documents = Vec::with_capacity(form.documents.len());
    {
        let mut documents = state.documents.write().await;
        for (original_name, bytes) in form.documents {
            let stored_name = format!("{}_{original_name}", mint_id());
            documents.insert(
                stored_name.clone(),
                StoredDocument {
                    task_id: task_id.clone(),
                    original_name: original_name.clone(),
                    bytes,
                },
            );
            attached_documents.push(Document {
                stored_name,
                original_name,
            });
        }
    }

    let task = Task {
        id: task_id.clone(),
        title,
        description: form.description,
        status: form.status.unwrap_or(TaskStatus::ToDo),
        priority: form.priority.unwrap_or(TaskPriority::Low),
        due_date,
        // Defaults to the caller when no assignee was specified.
        assigned_to: form
            .assigned_to
            .map_or_else(|| claims.user_id.clone(), UserId::new),
        created_by: claims.user_id.clone(),
        attached_documents,
    };

    state
        .tasks
        .write()
        .await
        .insert(task_id.to_string(), task.clone());
    tracing::info!(task = %task_id, by = %claims.user_id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// Admin or assignee may touch a task; anyone else gets a 403.
fn authorize_task_access(claims: &Claims, task: &Task) -> Result<(), ApiFailure> {
    if claims.is_admin() || task.assigned_to == claims.user_id {
        Ok(())
    } else {
        Err(failure(
            StatusCode::FORBIDDEN,
            "You do not have permission to modify this task",
        ))
    }
}

/// `PUT /tasks/:id` — metadata update. Documents are immutable and not
/// accepted here.
pub async fn update(
    claims: Claims,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(fields): Json<TaskFields>,
) -> Result<Json<Ack>, ApiFailure> {
    if fields.title.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Title is required"));
    }

    let mut tasks = state.tasks.write().await;
    let Some(task) = tasks.get_mut(&id) else {
        return Err(failure(StatusCode::NOT_FOUND, "Task not found"));
    };
    authorize_task_access(&claims, task)?;

    task.title = fields.title;
    task.description = fields.description;
    task.status = fields.status;
    task.priority = fields.priority;
    task.due_date = fields.due_date;
    if let Some(assignee) = fields.assigned_to {
        task.assigned_to = assignee;
    }

    tracing::info!(task = %id, by = %claims.user_id, "task updated");
    Ok(Json(Ack {
        msg: "Task updated successfully".to_string(),
    }))
}

/// `DELETE /tasks/:id` — removes the task and its stored documents.
pub async fn remove(
    claims: Claims,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiFailure> {
    let mut tasks = state.tasks.write().await;
    let Some(task) = tasks.get(&id) else {
        return Err(failure(StatusCode::NOT_FOUND, "Task not found"));
    };
    authorize_task_access(&claims, task)?;

    let task_id = task.id.clone();
    tasks.remove(&id);
    drop(tasks);

    state
        .documents
        .write()
        .await
        .retain(|_, doc| doc.task_id != task_id);

    tracing::info!(task = %id, by = %claims.user_id, "task deleted");
    Ok(Json(Ack {
        msg: "Task deleted successfully".to_string(),
    }))
}

/// `GET /tasks/:id/documents/:stored_name` — raw document bytes.
pub async fn download(
    _claims: Claims,
    State(state): State<Arc<ServerState>>,
    Path((id, stored_name)): Path<(String, String)>,
) -> Result<Response, ApiFailure> {
    let documents = state.documents.read().await;
    let Some(doc) = documents
        .get(&stored_name)
        .filter(|d| d.task_id.as_str() == id)
    else {
        return Err(failure(StatusCode::NOT_FOUND, "Document not found"));
    };

    Ok((
        [(header::CONTENT_TYPE, DOCUMENT_CONTENT_TYPE)],
        doc.bytes.clone(),
    )
        .into_response())
}
