use entities::{
    constant::{
        CITY_BH, CITY_CONGONHAS, CITY_LAFAIETE, COLETAS_FORA_ROUTE, ENTREGAS_LAFA_ROUTE,
        ENTREGAS_NOTURNAS_ROUTE, OPERACAO_BH_ROUTE,
    },
    BucketId, Driver, RouteSettings, Task, TaskType, TimeBlock,
};

const UNKNOWN_DRIVER_NAME: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentRule {
    /// `assignedTo` must equal the bucket's backing id (null for the unassigned bucket).
    Backing,
    Any,
}

/// Filter over `(type, city, assignedTo)`. Empty `cities` accepts every city.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPredicate {
    pub task_type: Option<TaskType>,
    pub cities: Vec<String>,
    pub assignment: AssignmentRule,
}

impl TaskPredicate {
    pub fn assigned() -> Self {
        Self {
            task_type: None,
            cities: Vec::new(),
            assignment: AssignmentRule::Backing,
        }
    }

    pub fn of_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    pub fn in_cities(mut self, cities: &[&str]) -> Self {
        self.cities = cities.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn any_assignment(mut self) -> Self {
        self.assignment = AssignmentRule::Any;
        self
    }

    /// Type and city checks only; the assignment is what a move changes.
    pub fn accepts_location(&self, task: &Task) -> bool {
        self.task_type.map_or(true, |t| t == task.r#type)
            && (self.cities.is_empty() || self.cities.iter().any(|c| *c == task.city))
    }

    pub fn matches(&self, bucket: &BucketId, task: &Task) -> bool {
        self.accepts_location(task)
            && match self.assignment {
                AssignmentRule::Backing => task.assigned_to.as_deref() == bucket.backing_id(),
                AssignmentRule::Any => true,
            }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketDefinition {
    pub id: BucketId,
    pub name: String,
    pub block: TimeBlock,
    pub predicate: TaskPredicate,
}

impl BucketDefinition {
    pub fn new(
        id: BucketId,
        name: impl Into<String>,
        block: TimeBlock,
        predicate: TaskPredicate,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            block,
            predicate,
        }
    }
}

/// Bucket definitions in priority order. The first matching definition claims a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketTable {
    definitions: Vec<BucketDefinition>,
}

impl BucketTable {
    pub fn new(definitions: Vec<BucketDefinition>) -> Self {
        let mut unique: Vec<BucketDefinition> = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if !unique.iter().any(|d| d.id == definition.id) {
                unique.push(definition);
            }
        }

        Self {
            definitions: unique,
        }
    }

    /// The dashboard's routes: two fixed morning routes, one afternoon route per BH driver
    /// plus the unassigned pool, and the night deliveries.
    pub fn standard(settings: &RouteSettings, drivers: &[Driver]) -> Self {
        let mut definitions = vec![
            BucketDefinition::new(
                BucketId::fixed(ENTREGAS_LAFA_ROUTE),
                "Entregas Lafaiete",
                TimeBlock::Morning,
                TaskPredicate::assigned()
                    .of_type(TaskType::Delivery)
                    .in_cities(&[CITY_LAFAIETE]),
            ),
            BucketDefinition::new(
                BucketId::fixed(COLETAS_FORA_ROUTE),
                "Coletas Lafaiete/Congonhas",
                TimeBlock::Morning,
                TaskPredicate::assigned()
                    .of_type(TaskType::Pickup)
                    .in_cities(&[CITY_LAFAIETE, CITY_CONGONHAS]),
            ),
        ];

        definitions.extend(settings.drivers_for(OPERACAO_BH_ROUTE).iter().map(|id| {
            let name = drivers
                .iter()
                .find(|d| &d.id == id)
                .map(|d| d.name.as_str())
                .unwrap_or(UNKNOWN_DRIVER_NAME);

            BucketDefinition::new(
                BucketId::driver(id.as_str()),
                format!("Rota BH - {name}"),
                TimeBlock::Afternoon,
                TaskPredicate::assigned().in_cities(&[CITY_BH]),
            )
        }));

        definitions.push(BucketDefinition::new(
            BucketId::Unassigned,
            "Não atribuído",
            TimeBlock::Afternoon,
            TaskPredicate::assigned(),
        ));
        definitions.push(BucketDefinition::new(
            BucketId::fixed(ENTREGAS_NOTURNAS_ROUTE),
            "Entregas Congonhas",
            TimeBlock::Night,
            TaskPredicate::assigned()
                .of_type(TaskType::Delivery)
                .in_cities(&[CITY_CONGONHAS]),
        ));

        Self::new(definitions)
    }

    pub fn definitions(&self) -> &[BucketDefinition] {
        &self.definitions
    }

    pub fn get(&self, id: &BucketId) -> Option<&BucketDefinition> {
        self.definitions.iter().find(|d| &d.id == id)
    }

    pub fn classify(&self, task: &Task) -> Option<&BucketDefinition> {
        self.definitions
            .iter()
            .find(|d| d.predicate.matches(&d.id, task))
    }
}
