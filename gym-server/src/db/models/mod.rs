//! Database Models
//!
//! 数据库模型定义. All persisted documents serialize camelCase; record links
//! are stored as SurrealDB record ids and exposed as "table:key" strings.

pub mod attendance;
pub mod class;
pub mod payment;
pub mod serde_helpers;
pub mod user;
pub mod workout;

pub use attendance::{
    Attendance, AttendanceDetail, AttendanceId, AttendanceWithClass, CheckInRequest,
};
pub use class::{
    Class, ClassCreate, ClassId, ClassSchedule, ClassUpdate, ClassWithTrainer, RosterEntry,
};
pub use payment::{Payment, PaymentCreate, PaymentId, PaymentWithUser, RevenueStats};
pub use user::{
    EmergencyContact, TrainerProfileUpdate, User, UserCreate, UserId, UserUpdate,
};
pub use workout::{
    Exercise, Workout, WorkoutCreate, WorkoutId, WorkoutUpdate, WorkoutWithTrainer,
};
