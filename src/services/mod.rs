pub mod authorization;
pub mod conditions;
pub mod group_buttons;
pub mod question_group_service;
pub mod session;
pub mod validation;

pub use authorization::{Crud, PermissionService};
pub use conditions::{ConditionService, GroupDependency};
pub use group_buttons::GroupButtonRenderer;
pub use question_group_service::{
    GroupChanges, GroupPage, GroupSearch, GroupSort, GroupSummary, NewGroup, QuestionGroupService,
    SortAttribute,
};
pub use session::{AdminSession, FlashLevel, FlashMessage};
pub use validation::ValidationService;
