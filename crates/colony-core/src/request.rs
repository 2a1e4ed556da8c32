//! Colony request manager and the payloads workers can ask for.
//!
//! Buildings submit a worker's need here and keep only the returned
//! [`RequestToken`]. Everything else about the request (payload, state) is
//! looked up through the manager.

use crate::id::{BlockPos, CitizenId, RequestToken};
use crate::item::ItemStack;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Tool categories a worker can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ToolClass {
    Hoe,
    Axe,
    Pickaxe,
    Shovel,
    Weapon,
}

impl ToolClass {
    /// Order in which simultaneous tool needs are reported.
    pub const PRIORITY: [ToolClass; 5] = [
        ToolClass::Hoe,
        ToolClass::Axe,
        ToolClass::Pickaxe,
        ToolClass::Shovel,
        ToolClass::Weapon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolClass::Hoe => "hoe",
            ToolClass::Axe => "axe",
            ToolClass::Pickaxe => "pickaxe",
            ToolClass::Shovel => "shovel",
            ToolClass::Weapon => "weapon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub class: ToolClass,
    /// Minimum material level (e.g. pickaxe mining level).
    pub min_level: u32,
}

/// What a worker asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requestable {
    Tool(ToolRequest),
    Stack(ItemStack),
    Delivery { stack: ItemStack, target: BlockPos },
    Food { quantity: u32 },
}

impl Requestable {
    pub fn kind(&self) -> RequestKind {
        match self {
            Requestable::Tool(_) => RequestKind::Tool,
            Requestable::Stack(_) => RequestKind::Stack,
            Requestable::Delivery { .. } => RequestKind::Delivery,
            Requestable::Food { .. } => RequestKind::Food,
        }
    }
}

/// Payload category, used as the key of a building's open-request index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    Tool,
    Stack,
    Delivery,
    Food,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    Created,
    InProgress,
    /// Delivered to the building, not yet picked up by the worker.
    Completed,
    /// Picked up by the worker.
    Received,
    Cancelled,
}

impl RequestState {
    /// Whether the manager considers the request finished.
    pub fn is_resolved(self) -> bool {
        matches!(self, RequestState::Received | RequestState::Cancelled)
    }
}

/// A request as held by the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub token: RequestToken,
    /// Building that submitted the request.
    pub building: BlockPos,
    pub requester: CitizenId,
    pub payload: Requestable,
    pub state: RequestState,
}

impl Request {
    pub fn tool(&self) -> Option<&ToolRequest> {
        match &self.payload {
            Requestable::Tool(tool) => Some(tool),
            _ => None,
        }
    }

    /// The stack carried by a stack or delivery request.
    pub fn stack(&self) -> Option<&ItemStack> {
        match &self.payload {
            Requestable::Stack(stack) | Requestable::Delivery { stack, .. } => Some(stack),
            _ => None,
        }
    }
}

/// Per-colony store of requests, keyed by token.
#[derive(Debug, Clone, Default)]
pub struct RequestManager {
    requests: SlotMap<RequestToken, Request>,
}

impl RequestManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new request and return its token.
    pub fn create_and_assign(
        &mut self,
        building: BlockPos,
        requester: CitizenId,
        payload: Requestable,
    ) -> RequestToken {
        self.requests.insert_with_key(|token| Request {
            token,
            building,
            requester,
            payload,
            state: RequestState::Created,
        })
    }

    pub fn get(&self, token: RequestToken) -> Option<&Request> {
        self.requests.get(token)
    }

    /// Move a request to `state`. Returns false for an unknown token.
    pub fn set_state(&mut self, token: RequestToken, state: RequestState) -> bool {
        match self.requests.get_mut(token) {
            Some(request) => {
                request.state = state;
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self, token: RequestToken) -> bool {
        self.set_state(token, RequestState::Cancelled)
    }

    /// Forget a request entirely.
    pub fn remove(&mut self, token: RequestToken) -> Option<Request> {
        self.requests.remove(token)
    }

    /// Requests submitted by the building at `building`.
    pub fn requests_of(&self, building: BlockPos) -> impl Iterator<Item = &Request> {
        self.requests.values().filter(move |r| r.building == building)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ItemTypeId;

    const HUT: BlockPos = BlockPos::new(0, 0, 0);

    fn axe() -> Requestable {
        Requestable::Tool(ToolRequest {
            class: ToolClass::Axe,
            min_level: 0,
        })
    }

    #[test]
    fn create_and_lookup() {
        let mut manager = RequestManager::new();
        let token = manager.create_and_assign(HUT, CitizenId(1), axe());
        let request = manager.get(token).unwrap();
        assert_eq!(request.token, token);
        assert_eq!(request.requester, CitizenId(1));
        assert_eq!(request.state, RequestState::Created);
        assert_eq!(request.tool().unwrap().class, ToolClass::Axe);
        assert!(request.stack().is_none());
    }

    #[test]
    fn cancel_and_remove() {
        let mut manager = RequestManager::new();
        let token = manager.create_and_assign(HUT, CitizenId(1), axe());
        assert!(manager.cancel(token));
        assert!(manager.get(token).unwrap().state.is_resolved());
        assert!(manager.remove(token).is_some());
        assert!(manager.get(token).is_none());
        assert!(!manager.cancel(token));
    }

    #[test]
    fn requests_of_filters_by_building() {
        let mut manager = RequestManager::new();
        let other = BlockPos::new(5, 0, 5);
        manager.create_and_assign(HUT, CitizenId(1), axe());
        manager.create_and_assign(other, CitizenId(2), Requestable::Food { quantity: 3 });
        assert_eq!(manager.requests_of(HUT).count(), 1);
        assert_eq!(manager.requests_of(other).count(), 1);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn payload_kinds() {
        let stack = ItemStack::new(ItemTypeId(3), 4);
        assert_eq!(axe().kind(), RequestKind::Tool);
        assert_eq!(Requestable::Stack(stack.clone()).kind(), RequestKind::Stack);
        assert_eq!(
            Requestable::Delivery {
                stack,
                target: HUT
            }
            .kind(),
            RequestKind::Delivery
        );
        assert_eq!(Requestable::Food { quantity: 1 }.kind(), RequestKind::Food);
    }

    #[test]
    fn tool_priority_order() {
        assert_eq!(ToolClass::PRIORITY[0], ToolClass::Hoe);
        assert_eq!(ToolClass::PRIORITY[4], ToolClass::Weapon);
        assert_eq!(ToolClass::Pickaxe.as_str(), "pickaxe");
    }
}
