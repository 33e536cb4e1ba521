pub mod audit_logs;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod developers;
pub mod favorite_items;
pub mod favorites;
pub mod games;
pub mod libraries;
pub mod library_items;
pub mod order_items;
pub mod orders;
pub mod reviews;
pub mod roles;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use developers::Entity as Developers;
pub use favorite_items::Entity as FavoriteItems;
pub use favorites::Entity as Favorites;
pub use games::Entity as Games;
pub use libraries::Entity as Libraries;
pub use library_items::Entity as LibraryItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use reviews::Entity as Reviews;
pub use roles::Entity as Roles;
pub use users::Entity as Users;
