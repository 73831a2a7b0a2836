//! Storefront products.

use super::message;
use crate::auth::AdminContext;
use crate::error::{ApiError, ApiResult, Json};
use crate::state::AppState;
use crate::uploads::{FormData, PRODUCT_IMAGES};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension,
};
use flylight_core::Product;
use tracing::{info, instrument};

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.store.list_products().await?))
}

pub async fn admin_list_products(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.store.list_products_by_seller(admin.user_id()).await?))
}

#[instrument(skip_all, fields(admin = %admin.user.email))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let mut form = FormData::from_multipart(multipart).await?;

    let price = form
        .parse::<f64>("price")?
        .ok_or_else(|| ApiError::bad_request("price is required"))?;
    let mut product = Product::new(form.require("name")?, price)?
        .with_stock(form.parse::<i64>("stock")?.unwrap_or(0))
        .with_seller(admin.user_id());
    product.description = form.text("description").map(String::from);
    product.category = form.text("category").map(String::from);

    if let Some(file) = form.take_file("image") {
        product.image_url = state.uploads.save(PRODUCT_IMAGES, &file).await?;
    }
    state.store.insert_product(&product).await?;

    info!("Product {} created", product.id);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": product.id,
            "message": "Product created successfully",
        })),
    ))
}

#[instrument(skip_all, fields(product_id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<serde_json::Value>> {
    let mut product = state
        .store
        .find_product(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    let mut form = FormData::from_multipart(multipart).await?;

    if let Some(name) = form.text("name").filter(|n| !n.trim().is_empty()) {
        product.name = name.to_string();
    }
    if let Some(description) = form.text("description") {
        product.description = Some(description.to_string());
    }
    if let Some(price) = form.parse::<f64>("price")? {
        if !price.is_finite() || price < 0.0 {
            return Err(ApiError::bad_request("Product price must be a non-negative number"));
        }
        product.price = price;
    }
    if let Some(stock) = form.parse::<i64>("stock")? {
        product.stock = stock;
    }
    if let Some(category) = form.text("category") {
        product.category = Some(category.to_string());
    }
    if let Some(file) = form.take_file("image") {
        if let Some(url) = state.uploads.save(PRODUCT_IMAGES, &file).await? {
            product.image_url = Some(url);
        }
    }

    state.store.update_product(&product).await?;
    Ok(message("Product updated successfully"))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.store.delete_product(&id).await? {
        return Err(ApiError::not_found("Product not found"));
    }
    info!("Product {} deleted", id);
    Ok(message("Product deleted successfully"))
}
