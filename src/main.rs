use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use leavedesk::Config;
use leavedesk::database::{
    init_database,
    repositories::{
        CalendarRepository, EmployeeRepository, LeaveRequestRepository, NotificationRepository,
    },
};
use leavedesk::handlers::{calendar, leave, notifications, stats};
use leavedesk::services::{LeaveService, NotificationService};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("LeaveDesk API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    println!("🚀 Starting LeaveDesk API server...");

    // Load configuration
    let config = Config::from_env()?;
    println!(
        "📋 Configuration loaded (environment: {})",
        config.environment
    );

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    println!("✅ Database initialized");

    // Initialize repositories and services
    let leave_repository = LeaveRequestRepository::new(pool.clone());
    let calendar_repository = CalendarRepository::new(pool.clone());
    let employee_repository = EmployeeRepository::new(pool.clone());
    let notification_repository = NotificationRepository::new(pool.clone());

    let notification_service =
        NotificationService::from_config(notification_repository.clone(), &config);
    let leave_service = LeaveService::new(
        leave_repository,
        calendar_repository.clone(),
        employee_repository,
        notification_service,
    );

    let leave_service_data = web::Data::new(leave_service);
    let calendar_repo_data = web::Data::new(calendar_repository);
    let notification_repo_data = web::Data::new(notification_repository);

    let server_address = config.server_address();
    println!("🌐 Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(leave_service_data.clone())
            .app_data(calendar_repo_data.clone())
            .app_data(notification_repo_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                    ])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/leave")
                            .route("", web::post().to(leave::submit_leave_request))
                            .route("", web::get().to(leave::list_leave_requests))
                            .route("/{id}", web::get().to(leave::get_leave_request))
                            .route("/{id}", web::put().to(leave::update_leave_request))
                            .route("/{id}", web::delete().to(leave::delete_leave_request))
                            .route(
                                "/{id}/dept-head-decision",
                                web::post().to(leave::dept_head_decision),
                            )
                            .route(
                                "/{id}/admin-decision",
                                web::post().to(leave::admin_decision),
                            ),
                    )
                    .service(
                        web::scope("/calendar")
                            .route("/exceptions", web::post().to(calendar::create_exception))
                            .route("/exceptions", web::get().to(calendar::list_exceptions))
                            .route(
                                "/exceptions/{id}",
                                web::delete().to(calendar::delete_exception),
                            ),
                    )
                    .service(
                        web::scope("/stats").route("/leave", web::get().to(stats::leave_stats)),
                    )
                    .service(web::scope("/notifications").route(
                        "/{employee_id}",
                        web::get().to(notifications::list_notifications),
                    )),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
