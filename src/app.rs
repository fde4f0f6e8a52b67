// src/app.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::{config::AppState, handlers, middleware::auth::auth_guard};

/// Monta o router completo da API.
pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/seed", post(handlers::seed::seed));

    // Rotas protegidas pelo middleware de autenticação
    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        // Usuários
        .route("/api/users"
               ,get(handlers::auth::list_users)
               .post(handlers::auth::create_user)
        )
        .route("/api/users/{id}", put(handlers::auth::update_user))
        // Pacientes
        .route("/api/patients"
               ,get(handlers::crm::list_patients)
               .post(handlers::crm::create_patient)
        )
        .route("/api/patients/{id}"
               ,get(handlers::crm::get_patient)
               .put(handlers::crm::update_patient)
               .delete(handlers::crm::delete_patient)
        )
        // Procedimentos
        .route("/api/procedures"
               ,get(handlers::operations::list_procedures)
               .post(handlers::operations::create_procedure)
        )
        .route("/api/procedures/{id}"
               ,put(handlers::operations::update_procedure)
               .delete(handlers::operations::delete_procedure)
        )
        // Agendamentos
        .route("/api/appointments"
               ,get(handlers::operations::list_appointments)
               .post(handlers::operations::create_appointment)
        )
        .route("/api/appointments/{id}"
               ,get(handlers::operations::get_appointment)
               .put(handlers::operations::update_appointment)
               .delete(handlers::operations::delete_appointment)
        )
        .route("/api/appointments/{id}/status"
               ,patch(handlers::operations::update_appointment_status)
        )
        // Tratamentos
        .route("/api/treatments"
               ,get(handlers::operations::list_treatments)
               .post(handlers::operations::create_treatment)
        )
        .route("/api/treatments/{id}"
               ,delete(handlers::operations::delete_treatment)
        )
        // Estoque
        .route("/api/products"
               ,get(handlers::inventory::list_products)
               .post(handlers::inventory::create_product)
        )
        .route("/api/products/{id}"
               ,get(handlers::inventory::get_product)
               .put(handlers::inventory::update_product)
               .delete(handlers::inventory::delete_product)
        )
        .route("/api/stock-movements"
               ,get(handlers::inventory::list_stock_movements)
               .post(handlers::inventory::create_stock_movement)
        )
        // Financeiro
        .route("/api/financial-records"
               ,get(handlers::finance::list_financial_records)
               .post(handlers::finance::create_financial_record)
        )
        .route("/api/financial-records/summary", get(handlers::finance::get_summary))
        .route("/api/financial-records/{id}"
               ,delete(handlers::finance::delete_financial_record)
        )
        // Painel
        .route("/api/dashboard/stats", get(handlers::dashboard::get_stats))
        // Backup (ADMIN)
        .route("/api/backup"
               ,delete(handlers::backup::clear_data)
        )
        .route("/api/backup/export", get(handlers::backup::export_backup))
        .route("/api/backup/import", post(handlers::backup::import_backup))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
