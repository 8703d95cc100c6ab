//! Blog, testimonial and FAQ routes

use axum::Router;
use domain_content::{
    BlogService, FaqService, MongoBlogRepository, MongoFaqRepository,
    MongoTestimonialRepository, TestimonialService, handlers,
};
use mongodb::Database;

use crate::state::AppState;

pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoBlogRepository::new(db).init_indexes().await?;
    MongoTestimonialRepository::new(db).init_indexes().await?;
    MongoFaqRepository::new(db).init_indexes().await?;
    Ok(())
}

pub fn router(state: &AppState) -> Router {
    let blogs = BlogService::new(MongoBlogRepository::new(&state.db), state.storage.clone());
    let testimonials = TestimonialService::new(
        MongoTestimonialRepository::new(&state.db),
        state.storage.clone(),
    );
    let faqs = FaqService::new(MongoFaqRepository::new(&state.db));

    Router::new()
        .nest("/blogs", handlers::blogs_router(blogs))
        .nest("/testimonials", handlers::testimonials_router(testimonials))
        .nest("/faqs", handlers::faqs_router(faqs))
}
