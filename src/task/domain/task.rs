//! Task record and its lifecycle transitions.
//!
//! The methods here are role-agnostic: they enforce state guards only.
//! Who may invoke each transition is decided by [`super::authorize`].

use super::{
    Budget, DeliveryRecord, DeliveryStatus, ExtensionRequest, PaymentStatus, TaskAction,
    TaskAttributes, TaskDomainError, TaskId, TaskPatch, TaskStatus, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A unit of paid work posted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    client_id: UserId,
    #[serde(flatten)]
    attributes: TaskAttributes,
    deadline: Option<DateTime<Utc>>,
    status: TaskStatus,
    assigned_worker_id: Option<UserId>,
    delivery_status: DeliveryStatus,
    deliveries: Vec<DeliveryRecord>,
    delivered_at: Option<DateTime<Utc>>,
    received_at: Option<DateTime<Utc>>,
    payment_status: PaymentStatus,
    paid_at: Option<DateTime<Utc>>,
    time_extension_request: Option<ExtensionRequest>,
    extension_history: Vec<ExtensionRequest>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning client.
    pub client_id: UserId,
    /// Descriptive attributes.
    pub attributes: TaskAttributes,
    /// Current deadline, if any.
    pub deadline: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Assigned worker, if any.
    pub assigned_worker_id: Option<UserId>,
    /// Delivery sub-state.
    pub delivery_status: DeliveryStatus,
    /// Delivery submissions, oldest first.
    pub deliveries: Vec<DeliveryRecord>,
    /// Latest delivery timestamp.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Receipt confirmation timestamp.
    pub received_at: Option<DateTime<Utc>>,
    /// Payment sub-state.
    pub payment_status: PaymentStatus,
    /// Payment timestamp.
    pub paid_at: Option<DateTime<Utc>>,
    /// Current extension request, if any.
    pub time_extension_request: Option<ExtensionRequest>,
    /// Superseded extension requests, oldest first.
    pub extension_history: Vec<ExtensionRequest>,
    /// Optimistic concurrency version.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest change timestamp.
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates an open task owned by `client_id`.
    #[must_use]
    pub fn new(
        client_id: UserId,
        attributes: TaskAttributes,
        deadline: Option<DateTime<Utc>>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            client_id,
            attributes,
            deadline,
            status: TaskStatus::Open,
            assigned_worker_id: None,
            delivery_status: DeliveryStatus::NotDelivered,
            deliveries: Vec::new(),
            delivered_at: None,
            received_at: None,
            payment_status: PaymentStatus::NotPaid,
            paid_at: None,
            time_extension_request: None,
            extension_history: Vec::new(),
            version: 0,
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            client_id: data.client_id,
            attributes: data.attributes,
            deadline: data.deadline,
            status: data.status,
            assigned_worker_id: data.assigned_worker_id,
            delivery_status: data.delivery_status,
            deliveries: data.deliveries,
            delivered_at: data.delivered_at,
            received_at: data.received_at,
            payment_status: data.payment_status,
            paid_at: data.paid_at,
            time_extension_request: data.time_extension_request,
            extension_history: data.extension_history,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning client.
    #[must_use]
    pub const fn client_id(&self) -> UserId {
        self.client_id
    }

    /// Returns the descriptive attributes.
    #[must_use]
    pub const fn attributes(&self) -> &TaskAttributes {
        &self.attributes
    }

    /// Returns the task budget.
    #[must_use]
    pub const fn budget(&self) -> Budget {
        self.attributes.budget()
    }

    /// Returns the current deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the assigned worker, if any.
    #[must_use]
    pub const fn assigned_worker_id(&self) -> Option<UserId> {
        self.assigned_worker_id
    }

    /// Returns the delivery sub-state.
    #[must_use]
    pub const fn delivery_status(&self) -> DeliveryStatus {
        self.delivery_status
    }

    /// Returns every delivery submission, oldest first.
    #[must_use]
    pub fn deliveries(&self) -> &[DeliveryRecord] {
        &self.deliveries
    }

    /// Returns the latest delivery timestamp.
    #[must_use]
    pub const fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// Returns the receipt confirmation timestamp.
    #[must_use]
    pub const fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_at
    }

    /// Returns the payment sub-state.
    #[must_use]
    pub const fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Returns the payment timestamp.
    #[must_use]
    pub const fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    /// Returns the current extension request, if any.
    #[must_use]
    pub const fn time_extension_request(&self) -> Option<&ExtensionRequest> {
        self.time_extension_request.as_ref()
    }

    /// Returns superseded extension requests, oldest first.
    #[must_use]
    pub fn extension_history(&self) -> &[ExtensionRequest] {
        &self.extension_history
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Applies a descriptive attribute update.
    pub fn apply_patch(&mut self, patch: TaskPatch, clock: &impl Clock) {
        self.attributes.apply(patch);
        self.touch(clock);
    }

    /// Fails unless the task may be deleted. Open and completed tasks are
    /// deletable.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskInProgress`] while a worker is assigned
    /// and the task is not yet completed.
    pub const fn ensure_deletable(&self) -> Result<(), TaskDomainError> {
        if matches!(self.status, TaskStatus::InProgress) {
            return Err(TaskDomainError::TaskInProgress {
                task_id: self.id,
                action: TaskAction::Delete,
            });
        }
        Ok(())
    }

    /// Fails unless the task is accepting applications.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskNotOpen`] otherwise.
    pub const fn ensure_open(&self) -> Result<(), TaskDomainError> {
        if matches!(self.status, TaskStatus::Open) {
            return Ok(());
        }
        Err(TaskDomainError::TaskNotOpen {
            task_id: self.id,
            status: self.status,
        })
    }

    /// Records the delivery of work.
    ///
    /// Re-delivery is permitted until the client confirms receipt; each
    /// submission is appended to [`Self::deliveries`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskNotInProgress`] unless the task is in
    /// progress, or [`TaskDomainError::DeliveryOutOfOrder`] once receipt has
    /// been confirmed.
    pub fn deliver(
        &mut self,
        delivered_by: UserId,
        message: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_in_progress(TaskAction::Deliver)?;
        if matches!(self.delivery_status, DeliveryStatus::Received) {
            return Err(TaskDomainError::DeliveryOutOfOrder {
                task_id: self.id,
                action: TaskAction::Deliver,
                expected: DeliveryStatus::Delivered,
                actual: self.delivery_status,
            });
        }
        let timestamp = clock.utc();
        self.deliveries
            .push(DeliveryRecord::new(delivered_by, message, timestamp));
        self.delivery_status = DeliveryStatus::Delivered;
        self.delivered_at = Some(timestamp);
        self.updated_at = timestamp;
        Ok(())
    }

    /// Confirms receipt of the delivered work.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DeliveryOutOfOrder`] unless the work is in
    /// the `Delivered` state.
    pub fn mark_received(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_delivery_status(DeliveryStatus::Delivered, TaskAction::MarkReceived)?;
        let timestamp = clock.utc();
        self.delivery_status = DeliveryStatus::Received;
        self.received_at = Some(timestamp);
        self.updated_at = timestamp;
        Ok(())
    }

    /// Settles payment and completes the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DeliveryOutOfOrder`] unless receipt has been
    /// confirmed, or [`TaskDomainError::AlreadyPaid`] when payment was already
    /// made.
    pub fn make_payment(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_delivery_status(DeliveryStatus::Received, TaskAction::MakePayment)?;
        if matches!(self.payment_status, PaymentStatus::Paid) {
            return Err(TaskDomainError::AlreadyPaid(self.id));
        }
        let timestamp = clock.utc();
        self.payment_status = PaymentStatus::Paid;
        self.paid_at = Some(timestamp);
        self.status = TaskStatus::Completed;
        self.completed_at = Some(timestamp);
        self.updated_at = timestamp;
        Ok(())
    }

    /// Installs a new pending extension request.
    ///
    /// A previous answered request is moved to [`Self::extension_history`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskNotInProgress`] unless the task is in
    /// progress, [`TaskDomainError::ExtensionAlreadyPending`] while an earlier
    /// request awaits an answer, or [`TaskDomainError::EmptyExtensionMessage`]
    /// for a blank message.
    pub fn request_extension(
        &mut self,
        requested_by: UserId,
        message: impl Into<String>,
        requested_deadline: Option<DateTime<Utc>>,
        clock: &impl Clock,
    ) -> Result<&ExtensionRequest, TaskDomainError> {
        self.ensure_in_progress(TaskAction::RequestExtension)?;
        if self
            .time_extension_request
            .as_ref()
            .is_some_and(ExtensionRequest::is_pending)
        {
            return Err(TaskDomainError::ExtensionAlreadyPending(self.id));
        }
        let timestamp = clock.utc();
        let request =
            ExtensionRequest::new(requested_by, message, requested_deadline, timestamp)?;
        if let Some(previous) = self.time_extension_request.take() {
            self.extension_history.push(previous);
        }
        self.updated_at = timestamp;
        Ok(self.time_extension_request.insert(request))
    }

    /// Answers the pending extension request.
    ///
    /// Approval of a request that carries a new deadline moves
    /// [`Self::deadline`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskNotInProgress`] unless the task is in
    /// progress, or [`TaskDomainError::NoPendingExtension`] when nothing awaits
    /// an answer.
    pub fn respond_extension(
        &mut self,
        approved: bool,
        response_message: Option<String>,
        clock: &impl Clock,
    ) -> Result<&ExtensionRequest, TaskDomainError> {
        self.ensure_in_progress(TaskAction::RespondExtension)?;
        let task_id = self.id;
        let request = self
            .time_extension_request
            .as_mut()
            .filter(|request| request.is_pending())
            .ok_or(TaskDomainError::NoPendingExtension(task_id))?;
        let timestamp = clock.utc();
        request.resolve(approved, response_message, timestamp);
        if approved {
            if let Some(new_deadline) = request.requested_deadline() {
                self.deadline = Some(new_deadline);
            }
        }
        self.updated_at = timestamp;
        Ok(request)
    }

    /// Assigns the task to the accepted worker and starts work.
    pub(crate) fn assign(
        &mut self,
        worker_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), TaskDomainError> {
        self.ensure_open()?;
        self.status = TaskStatus::InProgress;
        self.assigned_worker_id = Some(worker_id);
        self.updated_at = at;
        Ok(())
    }

    /// Advances the version and returns the one it replaced.
    pub(crate) const fn bump_version(&mut self) -> u64 {
        let previous = self.version;
        self.version = previous.saturating_add(1);
        previous
    }

    pub(crate) const fn touch_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    const fn ensure_in_progress(&self, action: TaskAction) -> Result<(), TaskDomainError> {
        if matches!(self.status, TaskStatus::InProgress) {
            return Ok(());
        }
        Err(TaskDomainError::TaskNotInProgress {
            task_id: self.id,
            status: self.status,
            action,
        })
    }

    fn ensure_delivery_status(
        &self,
        expected: DeliveryStatus,
        action: TaskAction,
    ) -> Result<(), TaskDomainError> {
        if self.delivery_status == expected {
            return Ok(());
        }
        Err(TaskDomainError::DeliveryOutOfOrder {
            task_id: self.id,
            action,
            expected,
            actual: self.delivery_status,
        })
    }
}
