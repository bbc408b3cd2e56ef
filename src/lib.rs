pub mod checkout;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::users::register_user,
        handlers::users::login_user,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::categories::list_categories,
        handlers::stores::create_store,
        handlers::stores::get_store_by_user,
        handlers::stores::list_store_products,
        handlers::orders::place_order,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::orders::list_store_orders,
    ),
    tags(
        (name = "users", description = "Registration and login"),
        (name = "products", description = "Product catalog"),
        (name = "categories", description = "Product categories"),
        (name = "stores", description = "Seller stores"),
        (name = "orders", description = "Order placement and tracking"),
    )
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/users")
                            .route("/register", web::post().to(handlers::users::register_user))
                            .route("/login", web::post().to(handlers::users::login_user)),
                    )
                    .service(
                        web::scope("/products")
                            .route("", web::get().to(handlers::products::list_products))
                            .route("", web::post().to(handlers::products::create_product))
                            .route("/{id}", web::get().to(handlers::products::get_product))
                            .route("/{id}", web::put().to(handlers::products::update_product))
                            .route("/{id}", web::delete().to(handlers::products::delete_product)),
                    )
                    .service(
                        web::scope("/categories")
                            .route("", web::get().to(handlers::categories::list_categories)),
                    )
                    .service(
                        web::scope("/stores")
                            .route("", web::post().to(handlers::stores::create_store))
                            .route(
                                "/by-user/{user_id}",
                                web::get().to(handlers::stores::get_store_by_user),
                            )
                            .route(
                                "/{store_id}/products",
                                web::get().to(handlers::stores::list_store_products),
                            )
                            .route(
                                "/{store_id}/orders",
                                web::get().to(handlers::orders::list_store_orders),
                            ),
                    )
                    .service(
                        web::scope("/orders")
                            .route("", web::post().to(handlers::orders::place_order))
                            .route("/{id}", web::get().to(handlers::orders::get_order))
                            .route(
                                "/{id}/status",
                                web::put().to(handlers::orders::update_order_status),
                            ),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
