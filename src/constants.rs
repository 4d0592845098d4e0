// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DEFAULT_DATABASE_FILE: &str = "expenses.db";

// Validation limits
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;
pub const MAX_EXPENSE_TITLE_LENGTH: usize = 255;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
pub const MAX_AMOUNT_SCALE: u32 = 4;

// Error messages
pub const ERR_CATEGORY_NOT_FOUND: &str = "Category not found";
pub const ERR_EXPENSE_NOT_FOUND: &str = "Expense not found";
pub const ERR_CATEGORY_DOES_NOT_EXIST: &str = "Category does not exist";
pub const ERR_CATEGORY_IN_USE: &str = "Cannot delete category: it has associated expenses";
