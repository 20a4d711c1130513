//! Diesel schema for task marketplace persistence.

diesel::table! {
    /// Posted tasks with delivery, payment, and extension sub-state.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning client.
        client_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Budget in whole currency units.
        budget -> Int8,
        /// Optional category label.
        #[max_length = 100]
        category -> Nullable<Varchar>,
        /// Required skills as a JSON array of strings.
        required_skills -> Jsonb,
        /// Current deadline.
        deadline -> Nullable<Timestamptz>,
        /// Task lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Worker assigned on acceptance.
        assigned_worker_id -> Nullable<Uuid>,
        /// Delivery sub-state.
        #[max_length = 50]
        delivery_status -> Varchar,
        /// Delivery submissions as a JSON array.
        deliveries -> Jsonb,
        /// Latest delivery timestamp.
        delivered_at -> Nullable<Timestamptz>,
        /// Receipt confirmation timestamp.
        received_at -> Nullable<Timestamptz>,
        /// Payment sub-state.
        #[max_length = 50]
        payment_status -> Varchar,
        /// Payment timestamp.
        paid_at -> Nullable<Timestamptz>,
        /// Current extension request as JSON.
        extension_request -> Nullable<Jsonb>,
        /// Superseded extension requests as a JSON array.
        extension_history -> Jsonb,
        /// Optimistic concurrency version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Worker applications, unique per (task, worker).
    applications (id) {
        /// Internal application identifier.
        id -> Uuid,
        /// Task applied to.
        task_id -> Uuid,
        /// Applying worker.
        worker_id -> Uuid,
        /// Cover letter text.
        cover_letter -> Text,
        /// Counter-offer in whole currency units.
        proposed_budget -> Nullable<Int8>,
        /// Completion estimate.
        estimated_completion_time -> Nullable<Text>,
        /// Application status.
        #[max_length = 50]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Client decision timestamp.
        responded_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(applications -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, applications);
