//! Client and task hierarchy generation.

use uuid::Uuid;

use taskboard::models::{
    CommentTarget, FinancialInfo, NewClient, NewClientGroup, NewClientTask, NewTaskComment,
    NewTaskList, NewTaskNote, NewTaskStage, NewTimeLog, NewUserTask, OverallStatus,
    SubtaskStatus,
};

use super::FakeData;

/// Which group a stage is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOwner {
    /// The acting owner's own group.
    ActingOwner,
    /// The company's first developer group.
    DeveloperGroup,
}

/// A phase every client task is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTemplate {
    pub name: &'static str,
    pub owner: StageOwner,
}

/// Stages of every client task, in order.
pub const STAGES: [StageTemplate; 2] = [
    StageTemplate {
        name: "Design",
        owner: StageOwner::ActingOwner,
    },
    StageTemplate {
        name: "Development",
        owner: StageOwner::DeveloperGroup,
    },
];

const BILLING_RATE: (f64, f64) = (50.0, 100.0);
const TIME_LOG_HOURS: (f64, f64) = (0.5, 5.0);
const DUE_WITHIN_DAYS: i64 = 30;

/// Generates client groups, clients, task lists, tasks, stages and subtasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkGenerator;

impl WorkGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn client_group(&self, company_id: Uuid, ordinal: usize, fake: &mut FakeData) -> NewClientGroup {
        NewClientGroup {
            company_id,
            name: format!("Client Group {ordinal}"),
            description: fake.sentence(),
        }
    }

    pub fn client(&self, company_id: Uuid, client_group_id: Uuid, fake: &mut FakeData) -> NewClient {
        NewClient {
            company_id,
            client_group_id,
            name: fake.company_name(),
            email: fake.email(),
            phone: fake.phone(),
            address: fake.street_address(),
            notes: fake.sentences(2),
        }
    }

    pub fn task_list(
        &self,
        company_id: Uuid,
        client_id: Uuid,
        ordinal: usize,
        fake: &mut FakeData,
    ) -> NewTaskList {
        NewTaskList {
            company_id,
            client_id,
            name: format!("List {ordinal}"),
            description: fake.sentence(),
            order_index: ordinal as i32,
        }
    }

    pub fn client_task(
        &self,
        company_id: Uuid,
        client_id: Uuid,
        list_id: Uuid,
        created_by_id: Uuid,
        ordinal: usize,
        fake: &mut FakeData,
    ) -> NewClientTask {
        NewClientTask {
            company_id,
            client_id,
            list_id,
            title: fake.sentence(),
            description: fake.paragraph(),
            due_date: fake.soon(DUE_WITHIN_DAYS),
            overall_status: fake
                .pick(&OverallStatus::ALL)
                .unwrap_or(OverallStatus::Pending),
            financial_info: FinancialInfo {
                billing_rate: fake.float_in(BILLING_RATE.0, BILLING_RATE.1, 2),
            },
            created_by_id,
            order_index: ordinal as i32,
        }
    }

    pub fn task_stage(
        &self,
        company_id: Uuid,
        client_task_id: Uuid,
        group_id: Uuid,
        stage: &StageTemplate,
        ordinal: usize,
        fake: &mut FakeData,
    ) -> NewTaskStage {
        NewTaskStage {
            company_id,
            client_task_id,
            group_id,
            name: stage.name.to_string(),
            description: format!("{} stage: {}", stage.name, fake.sentence()),
            order_index: ordinal as i32,
        }
    }

    /// Subtask assigned to and created by `user_id`.
    pub fn user_task(
        &self,
        stage: &NewTaskStage,
        task_stage_id: Uuid,
        user_id: Uuid,
        ordinal: usize,
        fake: &mut FakeData,
    ) -> NewUserTask {
        NewUserTask {
            client_task_id: stage.client_task_id,
            company_id: stage.company_id,
            assigned_user_id: user_id,
            created_by_id: user_id,
            task_stage_id,
            title: format!("Subtask {ordinal} for {}", stage.name),
            description: fake.sentences(2),
            status: SubtaskStatus::ToDo,
            order_index: ordinal as i32,
        }
    }

    pub fn time_log(&self, user_task_id: Uuid, user_id: Uuid, fake: &mut FakeData) -> NewTimeLog {
        NewTimeLog {
            user_task_id,
            user_id,
            hours: fake.float_in(TIME_LOG_HOURS.0, TIME_LOG_HOURS.1, 1),
            notes: fake.sentence(),
        }
    }

    pub fn task_note(&self, user_task_id: Uuid, user_id: Uuid, fake: &mut FakeData) -> NewTaskNote {
        NewTaskNote {
            user_task_id,
            user_id,
            note: fake.sentence(),
        }
    }

    pub fn task_comment(
        &self,
        target: CommentTarget,
        user_id: Uuid,
        fake: &mut FakeData,
    ) -> NewTaskComment {
        NewTaskComment {
            user_id,
            target,
            content: fake.sentence(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_templates() {
        assert_eq!(STAGES.len(), 2);
        assert_eq!(STAGES[0].name, "Design");
        assert_eq!(STAGES[0].owner, StageOwner::ActingOwner);
        assert_eq!(STAGES[1].name, "Development");
        assert_eq!(STAGES[1].owner, StageOwner::DeveloperGroup);
    }

    #[test]
    fn test_client_task_fields() {
        let work_gen = WorkGenerator::new();
        let mut fake = FakeData::seeded(21);
        let owner = Uuid::new_v4();
        let task = work_gen.client_task(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            owner,
            4,
            &mut fake,
        );

        assert_eq!(task.order_index, 4);
        assert_eq!(task.created_by_id, owner);
        assert!((50.0..=100.0).contains(&task.financial_info.billing_rate));
        assert!(OverallStatus::ALL.contains(&task.overall_status));
        assert!(!task.title.is_empty());
    }

    #[test]
    fn test_user_task_inherits_stage() {
        let work_gen = WorkGenerator::new();
        let mut fake = FakeData::seeded(22);
        let stage = work_gen.task_stage(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &STAGES[1],
            2,
            &mut fake,
        );
        assert!(stage.description.starts_with("Development stage: "));

        let user = Uuid::new_v4();
        let subtask = work_gen.user_task(&stage, Uuid::new_v4(), user, 3, &mut fake);
        assert_eq!(subtask.title, "Subtask 3 for Development");
        assert_eq!(subtask.company_id, stage.company_id);
        assert_eq!(subtask.client_task_id, stage.client_task_id);
        assert_eq!(subtask.assigned_user_id, user);
        assert_eq!(subtask.created_by_id, user);
        assert_eq!(subtask.status, SubtaskStatus::ToDo);
    }

    #[test]
    fn test_time_log_hours() {
        let work_gen = WorkGenerator::new();
        let mut fake = FakeData::seeded(23);
        for _ in 0..100 {
            let log = work_gen.time_log(Uuid::new_v4(), Uuid::new_v4(), &mut fake);
            assert!((0.5..=5.0).contains(&log.hours));
        }
    }
}
