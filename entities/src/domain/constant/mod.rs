// Document field constants
pub const ID_KEY: &str = "_id";
pub const PICKUP_TASK_KEY: &str = "pickupTask";
pub const DELIVERY_TASK_KEY: &str = "deliveryTask";
pub const ASSIGNED_TO_KEY: &str = "assignedTo";
pub const ORDER_IN_ROUTE_KEY: &str = "orderInRoute";
pub const STATUS_KEY: &str = "status";
pub const ASSIGNMENTS_KEY: &str = "assignments";

// Settings document constants
pub const ROUTE_SETTINGS_ID: &str = "routeAssignments";

// Route constants
pub const ENTREGAS_LAFA_ROUTE: &str = "entregas_lafa";
pub const COLETAS_FORA_ROUTE: &str = "coletas_fora";
pub const ENTREGAS_NOTURNAS_ROUTE: &str = "entregas_noturnas";
pub const OPERACAO_BH_ROUTE: &str = "operacao_bh";

// City constants
pub const CITY_LAFAIETE: &str = "Lafaiete";
pub const CITY_CONGONHAS: &str = "Congonhas";
pub const CITY_BH: &str = "BH";

// Bucket id constants
pub const FIXED_BUCKET_PREFIX: &str = "fixed:";
pub const DRIVER_BUCKET_PREFIX: &str = "driver:";
pub const UNASSIGNED_BUCKET: &str = "unassigned";
pub const TASK_REF_SEPARATOR: char = '|';

// Directions constants
pub const DIRECTIONS_PATH: &str = "/maps/api/directions/json";
pub const DIRECTIONS_OK_STATUS: &str = "OK";
pub const OPTIMIZE_WAYPOINTS_PREFIX: &str = "optimize:true";
