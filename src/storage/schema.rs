//! SQLite table definitions.
//!
//! One schema per service; each binary only creates the tables of the
//! stores it owns.

pub const CREATE_INGREDIENTS: &str = r#"
CREATE TABLE IF NOT EXISTS ingredients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ingredient_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    unit TEXT NOT NULL,
    category TEXT NOT NULL,
    min_stock_level REAL NOT NULL DEFAULT 0,
    current_stock REAL NOT NULL DEFAULT 0,
    cost_per_unit REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'active'
)
"#;

pub const CREATE_STOCK_MOVEMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS stock_movements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ingredient_id TEXT NOT NULL,
    direction TEXT NOT NULL,
    quantity REAL NOT NULL,
    reason TEXT,
    reference_id TEXT,
    reference_type TEXT,
    created_at TEXT NOT NULL
)
"#;

pub const CREATE_KITCHEN_TICKETS: &str = r#"
CREATE TABLE IF NOT EXISTS kitchen_tickets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id TEXT NOT NULL UNIQUE,
    table_number TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    items TEXT NOT NULL,
    priority INTEGER NOT NULL DEFAULT 0,
    estimated_minutes INTEGER,
    chef_id INTEGER,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

pub const CREATE_CHEFS: &str = r#"
CREATE TABLE IF NOT EXISTS chefs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'available',
    busy_count INTEGER NOT NULL DEFAULT 0,
    max_capacity INTEGER NOT NULL DEFAULT 5
)
"#;

pub const CREATE_LOYALTY_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS loyalty_accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id TEXT NOT NULL UNIQUE,
    total_points REAL NOT NULL DEFAULT 0,
    redeemed_points REAL NOT NULL DEFAULT 0,
    tier TEXT NOT NULL DEFAULT 'bronze',
    active INTEGER NOT NULL DEFAULT 1
)
"#;

pub const CREATE_LOYALTY_TRANSACTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS loyalty_transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    points REAL NOT NULL,
    order_id TEXT,
    description TEXT,
    created_at TEXT NOT NULL
)
"#;

pub const CREATE_ORDERS: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id TEXT NOT NULL UNIQUE,
    customer_id TEXT,
    table_number TEXT,
    items TEXT NOT NULL,
    subtotal REAL NOT NULL,
    tax REAL NOT NULL,
    service_charge REAL NOT NULL,
    discount REAL NOT NULL DEFAULT 0,
    loyalty_points_used REAL NOT NULL DEFAULT 0,
    loyalty_points_earned REAL NOT NULL DEFAULT 0,
    total REAL NOT NULL,
    payment_method TEXT NOT NULL DEFAULT 'cash',
    payment_status TEXT NOT NULL DEFAULT 'pending',
    order_status TEXT NOT NULL DEFAULT 'pending',
    kitchen_status TEXT,
    notes TEXT,
    kitchen_ticket_created INTEGER NOT NULL DEFAULT 0,
    stock_updated INTEGER NOT NULL DEFAULT 0,
    fulfillment TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    completed_at TEXT
)
"#;

pub const CREATE_MENUS: &str = r#"
CREATE TABLE IF NOT EXISTS menus (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    menu_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    price REAL NOT NULL,
    ingredients TEXT NOT NULL DEFAULT '[]',
    available INTEGER NOT NULL DEFAULT 1,
    preparation_minutes INTEGER NOT NULL DEFAULT 15
)
"#;
