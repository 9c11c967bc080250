//! 开发环境种子数据
//!
//! 清空现有数据后写入演示账号、课程、支付和训练计划，
//! 最后打印登录凭证。
//!
//! ```text
//! cargo run --bin seed
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use surrealdb::RecordId;

use gym_server::db::models::{
    ClassCreate, ClassSchedule, Exercise, PaymentCreate, TrainerProfileUpdate, User, UserCreate,
    WorkoutCreate,
};
use gym_server::db::repository::{
    ClassRepository, PaymentRepository, UserRepository, WorkoutRepository,
};
use gym_server::{Config, ServerState, expiry_from, setup_environment};
use shared::types::{
    ClassCategory, Difficulty, MembershipPlan, MembershipStatus, PaymentMethod, PaymentStatus,
    Role, Weekday, WorkoutCategory,
};
use shared::util::{DAY_MS, now_millis};

type BoxError = Box<dyn std::error::Error>;

fn dob(y: i32, m: u32, d: u32) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(y, m, d)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

fn user_payload(
    full_name: &str,
    email: &str,
    password: &str,
    phone: &str,
    date_of_birth: Option<i64>,
    role: Role,
    plan: MembershipPlan,
    expiry: i64,
    now: i64,
) -> UserCreate {
    UserCreate {
        full_name: full_name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        phone: Some(phone.to_string()),
        date_of_birth,
        role,
        membership_plan: plan,
        membership_status: MembershipStatus::Active,
        membership_expiry: expiry,
        join_date: now,
    }
}

fn ex(name: &str, sets: u32, reps: &str, rest: &str) -> Exercise {
    Exercise {
        name: name.to_string(),
        sets: Some(sets),
        reps: Some(reps.to_string()),
        rest: Some(rest.to_string()),
        notes: None,
    }
}

fn record_id(user: &User) -> Result<RecordId, BoxError> {
    Ok(user.id.clone().ok_or("user record missing id")?)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    setup_environment()?;

    let config = Config::from_env();
    let state = ServerState::initialize(&config).await;
    let db = state.get_db();

    let users = UserRepository::new(db.clone());
    let classes = ClassRepository::new(db.clone());
    let payments = PaymentRepository::new(db.clone());
    let workouts = WorkoutRepository::new(db.clone());

    let now = now_millis();
    let expiry = expiry_from(now, config.membership_duration_days);

    // 清空现有数据
    tracing::info!("🗑️  Clearing existing data...");
    db.query("DELETE user; DELETE class; DELETE payment; DELETE workout; DELETE attendance;")
        .await?
        .check()?;

    // 管理员
    tracing::info!("👤 Creating admin user...");
    users
        .create(user_payload(
            "Admin User",
            "admin@gym.com",
            "admin123",
            "1234567890",
            dob(1990, 1, 1),
            Role::Admin,
            MembershipPlan::Vip,
            expiry,
            now,
        ))
        .await?;

    // 教练
    tracing::info!("🏋️ Creating trainers...");
    let trainer1 = users
        .create(user_payload(
            "John Smith",
            "john@gym.com",
            "trainer123",
            "1234567891",
            dob(1988, 5, 15),
            Role::Trainer,
            MembershipPlan::Vip,
            expiry,
            now,
        ))
        .await?;
    users
        .update_trainer_profile(
            &trainer1.id_string(),
            TrainerProfileUpdate {
                specialization: Some(vec![
                    "Strength Training".into(),
                    "CrossFit".into(),
                    "Bodybuilding".into(),
                ]),
                bio: Some(
                    "Certified personal trainer with 10+ years of experience in strength and conditioning"
                        .into(),
                ),
                certifications: Some(vec![
                    "ACE Certified".into(),
                    "CrossFit Level 2".into(),
                    "Nutrition Specialist".into(),
                ]),
                availability: Some(HashMap::from([
                    (Weekday::Monday, vec!["06:00-12:00".into()]),
                    (Weekday::Thursday, vec!["15:00-19:00".into()]),
                ])),
            },
        )
        .await?;

    let trainer2 = users
        .create(user_payload(
            "Sarah Williams",
            "sarah@gym.com",
            "trainer123",
            "1234567892",
            dob(1992, 8, 20),
            Role::Trainer,
            MembershipPlan::Vip,
            expiry,
            now,
        ))
        .await?;
    users
        .update_trainer_profile(
            &trainer2.id_string(),
            TrainerProfileUpdate {
                specialization: Some(vec!["Yoga".into(), "Pilates".into(), "Meditation".into()]),
                bio: Some(
                    "Yoga instructor and wellness coach specializing in mindful movement".into(),
                ),
                certifications: Some(vec![
                    "RYT 500".into(),
                    "Pilates Mat Certified".into(),
                    "Mindfulness Coach".into(),
                ]),
                availability: Some(HashMap::from([
                    (Weekday::Tuesday, vec!["08:00-13:00".into()]),
                    (Weekday::Friday, vec!["09:00-14:00".into()]),
                ])),
            },
        )
        .await?;

    let trainer3 = users
        .create(user_payload(
            "Mike Johnson",
            "mike@gym.com",
            "trainer123",
            "1234567893",
            dob(1985, 3, 10),
            Role::Trainer,
            MembershipPlan::Vip,
            expiry,
            now,
        ))
        .await?;
    users
        .update_trainer_profile(
            &trainer3.id_string(),
            TrainerProfileUpdate {
                specialization: Some(vec!["Cardio".into(), "HIIT".into(), "Boxing".into()]),
                bio: Some(
                    "High-intensity training specialist and former professional boxer".into(),
                ),
                certifications: Some(vec![
                    "NASM Certified".into(),
                    "Boxing Coach".into(),
                    "HIIT Specialist".into(),
                ]),
                availability: None,
            },
        )
        .await?;

    // 会员
    tracing::info!("👥 Creating sample members...");
    let member1 = users
        .create(user_payload(
            "Alice Cooper",
            "alice@example.com",
            "member123",
            "2345678901",
            dob(1995, 6, 15),
            Role::Member,
            MembershipPlan::Premium,
            expiry,
            now,
        ))
        .await?;
    let member2 = users
        .create(user_payload(
            "Bob Davis",
            "bob@example.com",
            "member123",
            "2345678902",
            dob(1990, 12, 20),
            Role::Member,
            MembershipPlan::Basic,
            expiry,
            now,
        ))
        .await?;
    let member3 = users
        .create(user_payload(
            "Charlie Brown",
            "charlie@example.com",
            "member123",
            "2345678903",
            dob(1988, 4, 10),
            Role::Member,
            MembershipPlan::Vip,
            expiry,
            now,
        ))
        .await?;

    // 已过期会员 (状态仍为 Active，首次访问受限接口时惰性翻转)
    let mut lapsed = user_payload(
        "Dave Miller",
        "dave@example.com",
        "member123",
        "2345678904",
        dob(1993, 9, 5),
        Role::Member,
        MembershipPlan::Basic,
        now - 30 * DAY_MS,
        now,
    );
    lapsed.join_date = now - 395 * DAY_MS;
    users.create(lapsed).await?;

    let t1 = record_id(&trainer1)?;
    let t2 = record_id(&trainer2)?;
    let t3 = record_id(&trainer3)?;
    let m1 = record_id(&member1)?;
    let m2 = record_id(&member2)?;
    let m3 = record_id(&member3)?;

    // 课程
    tracing::info!("📅 Creating sample classes...");
    let class_rows: Vec<(
        &str,
        &str,
        RecordId,
        Weekday,
        &str,
        &str,
        u32,
        Vec<RecordId>,
        ClassCategory,
        Difficulty,
        u32,
    )> = vec![
        (
            "Morning CrossFit",
            "High-intensity CrossFit training to kickstart your day",
            t1.clone(),
            Weekday::Monday,
            "06:00",
            "07:00",
            20,
            vec![m1.clone(), m3.clone()],
            ClassCategory::CrossFit,
            Difficulty::Advanced,
            60,
        ),
        (
            "Yoga Flow",
            "Relaxing yoga session for all skill levels",
            t2.clone(),
            Weekday::Tuesday,
            "09:00",
            "10:00",
            15,
            vec![m1.clone(), m2.clone()],
            ClassCategory::Yoga,
            Difficulty::Beginner,
            60,
        ),
        (
            "HIIT Cardio",
            "Intense cardio workout to burn maximum calories",
            t3.clone(),
            Weekday::Wednesday,
            "18:00",
            "19:00",
            25,
            vec![m2.clone(), m3.clone()],
            ClassCategory::Cardio,
            Difficulty::Intermediate,
            60,
        ),
        (
            "Strength & Conditioning",
            "Build muscle and increase strength",
            t1.clone(),
            Weekday::Thursday,
            "17:00",
            "18:30",
            18,
            vec![m3.clone()],
            ClassCategory::Strength,
            Difficulty::Intermediate,
            90,
        ),
        (
            "Pilates Core",
            "Strengthen your core with Pilates",
            t2.clone(),
            Weekday::Friday,
            "10:00",
            "11:00",
            12,
            vec![m1.clone()],
            ClassCategory::Pilates,
            Difficulty::Beginner,
            60,
        ),
        (
            "Boxing Fundamentals",
            "Learn boxing techniques and get a great workout",
            t3.clone(),
            Weekday::Saturday,
            "11:00",
            "12:30",
            16,
            vec![],
            ClassCategory::Boxing,
            Difficulty::Beginner,
            90,
        ),
    ];

    for (name, desc, trainer, day, start, end, capacity, enrolled, category, difficulty, minutes) in
        class_rows
    {
        let created = classes
            .create(
                ClassCreate {
                    name: name.to_string(),
                    description: Some(desc.to_string()),
                    trainer: None,
                    schedule: ClassSchedule {
                        day_of_week: day,
                        start_time: start.to_string(),
                        end_time: end.to_string(),
                    },
                    capacity,
                    category,
                    difficulty,
                    duration_minutes: minutes,
                    image_url: None,
                },
                trainer,
            )
            .await?;
        let class_id = created
            .id
            .as_ref()
            .map(ToString::to_string)
            .ok_or("class record missing id")?;
        for member in &enrolled {
            classes.enroll(&class_id, member).await?;
        }
    }

    // 支付记录
    tracing::info!("💳 Creating sample payments...");
    let payment_rows = vec![
        (m1.clone(), 49.99, MembershipPlan::Premium, PaymentMethod::Card, "Monthly membership - Premium"),
        (m2.clone(), 29.99, MembershipPlan::Basic, PaymentMethod::Cash, "Monthly membership - Basic"),
        (m3.clone(), 79.99, MembershipPlan::Vip, PaymentMethod::Online, "Monthly membership - VIP"),
    ];
    for (member, amount, plan, method, desc) in payment_rows {
        payments
            .create(
                member,
                PaymentCreate {
                    amount,
                    plan,
                    status: Some(PaymentStatus::Completed),
                    payment_method: Some(method),
                    transaction_id: None,
                    description: Some(desc.to_string()),
                },
            )
            .await?;
    }

    // 训练计划
    tracing::info!("💪 Creating sample workouts...");
    let workout_rows = vec![
        (
            m1.clone(),
            t1.clone(),
            "Upper Body Strength",
            "Focus on building upper body strength",
            vec![
                ex("Bench Press", 4, "8-10", "90 seconds"),
                ex("Pull-ups", 3, "10-12", "60 seconds"),
                ex("Shoulder Press", 3, "10", "60 seconds"),
                ex("Bicep Curls", 3, "12-15", "45 seconds"),
            ],
            Weekday::Monday,
            WorkoutCategory::Strength,
            Difficulty::Intermediate,
            60,
        ),
        (
            m2.clone(),
            t2.clone(),
            "Yoga Beginner Flow",
            "Gentle yoga routine for beginners",
            vec![
                ex("Sun Salutation", 5, "1", "30 seconds"),
                ex("Warrior Poses", 3, "5 breaths each side", "30 seconds"),
                ex("Child's Pose", 1, "2 minutes", "N/A"),
            ],
            Weekday::Tuesday,
            WorkoutCategory::Flexibility,
            Difficulty::Beginner,
            45,
        ),
        (
            m3.clone(),
            t3.clone(),
            "HIIT Fat Burner",
            "High intensity interval training",
            vec![
                ex("Burpees", 4, "15", "30 seconds"),
                ex("Mountain Climbers", 4, "30", "30 seconds"),
                ex("Jump Squats", 4, "20", "30 seconds"),
                ex("High Knees", 4, "45 seconds", "30 seconds"),
            ],
            Weekday::Wednesday,
            WorkoutCategory::Cardio,
            Difficulty::Advanced,
            30,
        ),
    ];
    for (member, trainer, name, desc, exercises, day, category, difficulty, minutes) in workout_rows
    {
        workouts
            .create(
                member,
                Some(trainer),
                WorkoutCreate {
                    user_id: None,
                    trainer_id: None,
                    name: name.to_string(),
                    description: Some(desc.to_string()),
                    exercises,
                    day_of_week: Some(day),
                    category,
                    difficulty,
                    estimated_duration: Some(minutes),
                },
            )
            .await?;
    }

    tracing::info!("✅ Seed data created successfully!");

    println!("\n📧 Login Credentials:");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("👑 Admin:   admin@gym.com / admin123");
    println!("🏋️  Trainer: john@gym.com  / trainer123");
    println!("🏋️  Trainer: sarah@gym.com / trainer123");
    println!("🏋️  Trainer: mike@gym.com  / trainer123");
    println!("👤 Member:  alice@example.com / member123");
    println!("👤 Member:  bob@example.com   / member123");
    println!("👤 Member:  charlie@example.com / member123");
    println!("👤 Member:  dave@example.com  / member123 (expired)");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    Ok(())
}
