//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};
use storefront_app::{
    auth::MockAuthService,
    context::AppContext,
    domain::{
        orders::MockOrdersService,
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
        users::{
            MockUsersService,
            records::{Requester, Role, UserUuid},
        },
    },
};
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

pub(crate) const ADMIN: Requester = Requester {
    user: TEST_USER_UUID,
    role: Role::Admin,
};

pub(crate) const CUSTOMER: Requester = Requester {
    user: TEST_USER_UUID,
    role: Role::User,
};

/// Stands in for the auth middleware.
#[derive(Debug)]
pub(crate) struct InjectRequester(pub(crate) Requester);

#[handler]
impl InjectRequester {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_requester(self.0);
        ctrl.call_next(req, depot, res).await;
    }
}

pub(crate) fn make_product(uuid: ProductUuid) -> ProductRecord {
    ProductRecord {
        uuid,
        name: "Espresso cup".to_string(),
        description: "Stoneware, 90ml".to_string(),
        image_url: Some("https://images.example.com/cup.png".to_string()),
        price: Decimal::new(1250, 2),
        stock: 12,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_create_product().never();
    products.expect_update_product().never();
    products.expect_delete_product().never();

    products
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_place_order().never();
    orders.expect_list_orders().never();

    orders
}

fn strict_users_mock() -> MockUsersService {
    let mut users = MockUsersService::new();

    users.expect_register().never();
    users.expect_get_user().never();

    users
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_authenticate_bearer().never();

    auth
}

fn state(
    products: MockProductsService,
    orders: MockOrdersService,
    users: MockUsersService,
    auth: MockAuthService,
) -> Arc<State> {
    State::from_app_context(AppContext {
        products: Arc::new(products),
        orders: Arc::new(orders),
        users: Arc::new(users),
        auth: Arc::new(auth),
    })
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    state(
        strict_products_mock(),
        strict_orders_mock(),
        strict_users_mock(),
        auth,
    )
}

fn service_as(requester: Option<Requester>, state: Arc<State>, route: Router) -> Service {
    let mut router = Router::new().hoop(inject(state));

    if let Some(requester) = requester {
        router = router.hoop(InjectRequester(requester));
    }

    Service::new(router.push(route))
}

pub(crate) fn products_service(
    products: MockProductsService,
    requester: Requester,
    route: Router,
) -> Service {
    service_as(
        Some(requester),
        state(
            products,
            strict_orders_mock(),
            strict_users_mock(),
            strict_auth_mock(),
        ),
        route,
    )
}

pub(crate) fn orders_service(
    orders: MockOrdersService,
    requester: Requester,
    route: Router,
) -> Service {
    service_as(
        Some(requester),
        state(
            strict_products_mock(),
            orders,
            strict_users_mock(),
            strict_auth_mock(),
        ),
        route,
    )
}

/// Registration is public, so no requester is injected.
pub(crate) fn users_service(users: MockUsersService, route: Router) -> Service {
    service_as(
        None,
        state(
            strict_products_mock(),
            strict_orders_mock(),
            users,
            strict_auth_mock(),
        ),
        route,
    )
}
