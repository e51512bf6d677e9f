pub mod brand;
pub mod card;
pub mod fields;
pub mod filter;
