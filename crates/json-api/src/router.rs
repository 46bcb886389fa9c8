//! App Router

use salvo::Router;

use crate::{auth, orders, products, users};

/// Registration is public; everything else requires a bearer token.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("register").post(users::register::handler))
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(
                    Router::with_path("products")
                        .get(products::index::handler)
                        .post(products::create::handler)
                        .push(
                            Router::with_path("{product}")
                                .get(products::get::handler)
                                .put(products::update::handler)
                                .delete(products::delete::handler),
                        ),
                )
                .push(
                    Router::with_path("orders")
                        .get(orders::index::handler)
                        .post(orders::create::handler),
                ),
        )
}
