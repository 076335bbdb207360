use std::{
    cmp::Reverse,
    collections::{HashMap, HashSet},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard}
};

use uuid::Uuid;

use super::{
    DishFilter, OrderFilter, Repository, ReviewFilter, StoreError, StoreResult, UserFilter,
    ORDERS_SECRET_CODE_KEY, ORDERS_USER_FKEY, ORDER_ITEMS_DISH_FKEY, REVIEWS_USER_DISH_KEY,
    USERS_EMAIL_KEY
};
use crate::{
    models::{
        Dish, DishChanges, Order, OrderItem, OrderStatus, OrderWithItems, Review, ReviewChanges,
        ReviewReply, User, UserChanges
    },
    utils::PageRequest
};

#[derive(Default)]
struct Tables{
    users: Vec<User>,
    dishes: Vec<Dish>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    reviews: Vec<Review>,
    review_replies: Vec<ReviewReply>
}

/// Process-local [`Repository`] with the same constraint semantics as the
/// postgres schema: unique emails, unique secret codes, one review per
/// (user, dish), restricted deletion of ordered dishes and cascading deletes.
#[derive(Default)]
pub struct InMemoryRepository{
    tables: RwLock<Tables>
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::UnexpectedError(anyhow::anyhow!("In-memory store lock poisoned")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::UnexpectedError(anyhow::anyhow!("In-memory store lock poisoned")))
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn paginate<T: Clone>(rows: Vec<T>, page: PageRequest) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let items = rows.into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();

    (items, total)
}

impl Tables {
    fn order_with_items(&self, order: &Order) -> OrderWithItems {
        OrderWithItems{
            order: order.clone(),
            items: self.order_items
                .iter()
                .filter(|item| item.order_id == order.id)
                .cloned()
                .collect()
        }
    }

    fn remove_reviews(&mut self, doomed: impl Fn(&Review) -> bool) {
        let review_ids: HashSet<Uuid> = self.reviews
            .iter()
            .filter(|review| doomed(review))
            .map(|review| review.id)
            .collect();

        self.reviews.retain(|review| !review_ids.contains(&review.id));
        self.review_replies.retain(|reply| !review_ids.contains(&reply.review_id));
    }
}

impl Repository for InMemoryRepository {
    fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|user| user.id == id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|user| user.email == email).cloned())
    }

    fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        Ok(self.read()?.users.iter().filter(|user| ids.contains(&user.id)).cloned().collect())
    }

    fn list_users(&self, filter: &UserFilter, page: PageRequest) -> StoreResult<(Vec<User>, i64)> {
        let tables = self.read()?;
        let mut rows: Vec<User> = tables.users
            .iter()
            .filter(|user| filter.role.map_or(true, |role| user.role == role))
            .filter(|user| {
                filter.search.as_deref().map_or(true, |search| {
                    contains_ignore_case(&user.name, search) || contains_ignore_case(&user.email, search)
                })
            })
            .cloned()
            .collect();
        rows.sort_by_key(|user| (Reverse(user.created_at), user.id));

        Ok(paginate(rows, page))
    }

    fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.write()?;
        if tables.users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict(USERS_EMAIL_KEY.to_string()))
        }

        tables.users.push(user.clone());
        Ok(user)
    }

    fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User> {
        let mut tables = self.write()?;
        if let Some(email) = &changes.email {
            if tables.users.iter().any(|user| user.id != id && &user.email == email) {
                return Err(StoreError::Conflict(USERS_EMAIL_KEY.to_string()))
            }
        }

        let user = tables.users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = changes.name { user.name = name; }
        if let Some(email) = changes.email { user.email = email; }
        if let Some(password) = changes.password { user.password = password; }
        if let Some(telephone) = changes.telephone { user.telephone = Some(telephone); }
        if let Some(role) = changes.role { user.role = role; }
        if let Some(updated_at) = changes.updated_at { user.updated_at = updated_at; }

        Ok(user.clone())
    }

    fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.users.iter().any(|user| user.id == id) {
            return Err(StoreError::NotFound)
        }

        let order_ids: HashSet<Uuid> = tables.orders
            .iter()
            .filter(|order| order.user_id == id)
            .map(|order| order.id)
            .collect();
        tables.orders.retain(|order| !order_ids.contains(&order.id));
        tables.order_items.retain(|item| !order_ids.contains(&item.order_id));
        tables.remove_reviews(|review| review.user_id == id);
        tables.review_replies.retain(|reply| reply.user_id != id);
        for dish in tables.dishes.iter_mut().filter(|dish| dish.user_id == Some(id)) {
            dish.user_id = None;
        }
        tables.users.retain(|user| user.id != id);

        Ok(())
    }

    fn find_dish(&self, id: Uuid) -> StoreResult<Option<Dish>> {
        Ok(self.read()?.dishes.iter().find(|dish| dish.id == id).cloned())
    }

    fn find_dishes(&self, ids: &[Uuid]) -> StoreResult<Vec<Dish>> {
        Ok(self.read()?.dishes.iter().filter(|dish| ids.contains(&dish.id)).cloned().collect())
    }

    fn list_dishes(&self, filter: &DishFilter, page: PageRequest) -> StoreResult<(Vec<Dish>, i64)> {
        let tables = self.read()?;
        let mut rows: Vec<Dish> = tables.dishes
            .iter()
            .filter(|dish| {
                filter.search.as_deref().map_or(true, |search| {
                    contains_ignore_case(&dish.name, search) || contains_ignore_case(&dish.description, search)
                })
            })
            .filter(|dish| filter.min_price.map_or(true, |min| dish.price >= min))
            .filter(|dish| filter.max_price.map_or(true, |max| dish.price <= max))
            .filter(|dish| filter.owner_id.map_or(true, |owner| dish.user_id == Some(owner)))
            .cloned()
            .collect();
        rows.sort_by_key(|dish| (Reverse(dish.created_at), dish.id));

        Ok(paginate(rows, page))
    }

    fn insert_dish(&self, dish: Dish) -> StoreResult<Dish> {
        self.write()?.dishes.push(dish.clone());
        Ok(dish)
    }

    fn update_dish(&self, id: Uuid, changes: DishChanges) -> StoreResult<Dish> {
        let mut tables = self.write()?;
        let dish = tables.dishes
            .iter_mut()
            .find(|dish| dish.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = changes.name { dish.name = name; }
        if let Some(description) = changes.description { dish.description = description; }
        if let Some(image_url) = changes.image_url { dish.image_url = image_url; }
        if let Some(price) = changes.price { dish.price = price; }
        if let Some(updated_at) = changes.updated_at { dish.updated_at = updated_at; }

        Ok(dish.clone())
    }

    fn delete_dish(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.dishes.iter().any(|dish| dish.id == id) {
            return Err(StoreError::NotFound)
        }
        if tables.order_items.iter().any(|item| item.dish_id == id) {
            return Err(StoreError::Conflict(ORDER_ITEMS_DISH_FKEY.to_string()))
        }

        tables.remove_reviews(|review| review.dish_id == id);
        tables.dishes.retain(|dish| dish.id != id);

        Ok(())
    }

    fn find_order(&self, id: Uuid) -> StoreResult<Option<OrderWithItems>> {
        let tables = self.read()?;
        Ok(tables.orders
            .iter()
            .find(|order| order.id == id)
            .map(|order| tables.order_with_items(order)))
    }

    fn find_order_by_code(&self, secret_code: &str) -> StoreResult<Option<OrderWithItems>> {
        let tables = self.read()?;
        Ok(tables.orders
            .iter()
            .find(|order| order.secret_code == secret_code)
            .map(|order| tables.order_with_items(order)))
    }

    fn list_orders(&self, filter: &OrderFilter, page: PageRequest) -> StoreResult<(Vec<OrderWithItems>, i64)> {
        let tables = self.read()?;
        let mut rows: Vec<&Order> = tables.orders
            .iter()
            .filter(|order| filter.user_id.map_or(true, |user_id| order.user_id == user_id))
            .filter(|order| filter.status.map_or(true, |status| order.status == status))
            .collect();
        rows.sort_by_key(|order| (Reverse(order.created_at), order.id));

        let (rows, total) = paginate(rows, page);
        Ok((rows.into_iter().map(|order| tables.order_with_items(order)).collect(), total))
    }

    fn insert_order(&self, order: Order, items: Vec<OrderItem>) -> StoreResult<OrderWithItems> {
        let mut tables = self.write()?;
        if tables.orders.iter().any(|existing| existing.secret_code == order.secret_code) {
            return Err(StoreError::Conflict(ORDERS_SECRET_CODE_KEY.to_string()))
        }
        if !tables.users.iter().any(|user| user.id == order.user_id) {
            return Err(StoreError::Conflict(ORDERS_USER_FKEY.to_string()))
        }
        if items.iter().any(|item| !tables.dishes.iter().any(|dish| dish.id == item.dish_id)) {
            return Err(StoreError::Conflict(ORDER_ITEMS_DISH_FKEY.to_string()))
        }

        tables.orders.push(order.clone());
        tables.order_items.extend(items.iter().cloned());

        Ok(OrderWithItems{ order, items })
    }

    fn update_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<OrderWithItems> {
        let mut tables = self.write()?;
        let order = tables.orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(StoreError::NotFound)?;

        order.status = status;
        order.updated_at = chrono::Utc::now();
        let order = order.clone();

        Ok(tables.order_with_items(&order))
    }

    fn delete_order(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.orders.iter().any(|order| order.id == id) {
            return Err(StoreError::NotFound)
        }

        tables.orders.retain(|order| order.id != id);
        tables.order_items.retain(|item| item.order_id != id);

        Ok(())
    }

    fn find_review(&self, id: Uuid) -> StoreResult<Option<Review>> {
        Ok(self.read()?.reviews.iter().find(|review| review.id == id).cloned())
    }

    fn find_review_by_author(&self, user_id: Uuid, dish_id: Uuid) -> StoreResult<Option<Review>> {
        Ok(self.read()?
            .reviews
            .iter()
            .find(|review| review.user_id == user_id && review.dish_id == dish_id)
            .cloned())
    }

    fn list_reviews(&self, filter: &ReviewFilter, page: PageRequest) -> StoreResult<(Vec<Review>, i64)> {
        let tables = self.read()?;
        let mut rows: Vec<Review> = tables.reviews
            .iter()
            .filter(|review| filter.dish_id.map_or(true, |dish_id| review.dish_id == dish_id))
            .filter(|review| filter.user_id.map_or(true, |user_id| review.user_id == user_id))
            .filter(|review| filter.status.map_or(true, |status| review.status == status))
            .filter(|review| filter.featured.map_or(true, |featured| review.featured == featured))
            .cloned()
            .collect();
        rows.sort_by_key(|review| (Reverse(review.featured), Reverse(review.created_at), review.id));

        Ok(paginate(rows, page))
    }

    fn count_reviews_by_dish(&self, dish_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>> {
        let tables = self.read()?;
        let mut counts = HashMap::new();
        for review in tables.reviews.iter().filter(|review| dish_ids.contains(&review.dish_id)) {
            *counts.entry(review.dish_id).or_insert(0) += 1;
        }

        Ok(counts)
    }

    fn insert_review(&self, review: Review) -> StoreResult<Review> {
        let mut tables = self.write()?;
        if tables.reviews
            .iter()
            .any(|existing| existing.user_id == review.user_id && existing.dish_id == review.dish_id)
        {
            return Err(StoreError::Conflict(REVIEWS_USER_DISH_KEY.to_string()))
        }

        tables.reviews.push(review.clone());
        Ok(review)
    }

    fn update_review(&self, id: Uuid, changes: ReviewChanges) -> StoreResult<Review> {
        let mut tables = self.write()?;
        let review = tables.reviews
            .iter_mut()
            .find(|review| review.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(rating) = changes.rating { review.rating = rating; }
        if let Some(comment) = changes.comment { review.comment = comment; }
        if let Some(status) = changes.status { review.status = status; }
        if let Some(featured) = changes.featured { review.featured = featured; }
        if let Some(updated_at) = changes.updated_at { review.updated_at = updated_at; }

        Ok(review.clone())
    }

    fn delete_review(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        if !tables.reviews.iter().any(|review| review.id == id) {
            return Err(StoreError::NotFound)
        }

        tables.remove_reviews(|review| review.id == id);
        Ok(())
    }

    fn replies_for(&self, review_ids: &[Uuid]) -> StoreResult<Vec<ReviewReply>> {
        let mut replies: Vec<ReviewReply> = self.read()?
            .review_replies
            .iter()
            .filter(|reply| review_ids.contains(&reply.review_id))
            .cloned()
            .collect();
        replies.sort_by_key(|reply| (reply.created_at, reply.id));

        Ok(replies)
    }

    fn insert_reply(&self, reply: ReviewReply) -> StoreResult<ReviewReply> {
        let mut tables = self.write()?;
        if !tables.reviews.iter().any(|review| review.id == reply.review_id) {
            return Err(StoreError::NotFound)
        }

        tables.review_replies.push(reply.clone());
        Ok(reply)
    }
}
