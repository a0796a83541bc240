diesel::table! {
    users (id) {
        id -> Integer,
        name -> Text,
        email -> Text,
        password_hash -> Text,
        age -> Nullable<Integer>,
        condition -> Text,
        last_alert_sent -> Nullable<BigInt>,
        created_at -> BigInt,
        updated_at -> BigInt,
    }
}

diesel::table! {
    preferences (id) {
        id -> Integer,
        user_id -> Integer,
        daily_alerts -> Bool,
        medication_reminders -> Bool,
        appointment_reminders -> Bool,
        symptom_reminders -> Bool,
        goal_updates -> Bool,
        motivational_messages -> Bool,
        email_frequency -> Text,
        preferred_email_time -> Text,
    }
}

diesel::table! {
    medications (id) {
        id -> Integer,
        user_id -> Integer,
        name -> Text,
        dosage -> Text,
        frequency -> Text,
        times -> Text,
        instructions -> Nullable<Text>,
        is_active -> Bool,
        send_reminders -> Bool,
        created_at -> BigInt,
        updated_at -> BigInt,
    }
}

diesel::table! {
    symptoms (id) {
        id -> Integer,
        user_id -> Integer,
        symptom_type -> Text,
        severity -> Integer,
        description -> Nullable<Text>,
        duration -> Nullable<Text>,
        triggers -> Nullable<Text>,
        recorded_at -> BigInt,
    }
}

diesel::table! {
    health_goals (id) {
        id -> Integer,
        user_id -> Integer,
        title -> Text,
        description -> Text,
        category -> Text,
        target_value -> Double,
        current_value -> Double,
        unit -> Text,
        deadline -> Nullable<BigInt>,
        is_completed -> Bool,
        priority -> Text,
        created_at -> BigInt,
        updated_at -> BigInt,
    }
}

diesel::table! {
    reminders (id) {
        id -> Integer,
        user_id -> Integer,
        reminder_type -> Text,
        title -> Text,
        message -> Text,
        scheduled_time -> BigInt,
        is_recurring -> Bool,
        recurrence_pattern -> Nullable<Text>,
        is_completed -> Bool,
        priority -> Text,
        send_email -> Bool,
        email_sent -> Bool,
        email_sent_at -> Nullable<BigInt>,
        created_at -> BigInt,
    }
}

diesel::table! {
    health_metrics (id) {
        id -> Integer,
        user_id -> Integer,
        metric_type -> Text,
        value -> Double,
        unit -> Text,
        notes -> Text,
        recorded_at -> BigInt,
        is_critical -> Bool,
        alert_sent -> Bool,
    }
}

diesel::table! {
    ai_usage (id) {
        id -> Integer,
        month -> Text,
        calls -> BigInt,
    }
}

diesel::joinable!(preferences -> users (user_id));
diesel::joinable!(medications -> users (user_id));
diesel::joinable!(symptoms -> users (user_id));
diesel::joinable!(health_goals -> users (user_id));
diesel::joinable!(reminders -> users (user_id));
diesel::joinable!(health_metrics -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    preferences,
    medications,
    symptoms,
    health_goals,
    reminders,
    health_metrics,
    ai_usage,
);
