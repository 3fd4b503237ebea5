use super::{CompiledGraph, GraphError, END};
use crate::agent::AgentTurn;
use crate::message::{Message, MessagesState, ToolCall};
use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream, TryStreamExt};
use uuid::Uuid;

/// Snapshot emitted after each node completes
#[derive(Debug, Clone, PartialEq)]
pub struct NodeUpdate {
    pub run_id: Uuid,
    /// 1-based position of this node execution in the run
    pub step: usize,
    pub node: String,
    /// Messages this step added to the conversation
    pub appended: Vec<Message>,
    /// Whole conversation after this step
    pub messages: MessagesState,
    /// Node that runs next, or [`END`]
    pub next: String,
    pub completed_at: DateTime<Utc>,
}

impl NodeUpdate {
    pub fn last_message(&self) -> Option<&Message> {
        self.appended.last()
    }

    pub fn is_final(&self) -> bool {
        self.next == END
    }
}

struct Cursor {
    run_id: Uuid,
    next: String,
    state: MessagesState,
    step: usize,
}

impl CompiledGraph {
    /// Run the graph, yielding one update per completed node.
    ///
    /// Nodes run strictly one after another. The first error ends the
    /// stream; nothing is retried.
    pub fn stream(
        &self,
        input: MessagesState,
    ) -> impl Stream<Item = Result<NodeUpdate>> + Send + '_ {
        let run_id = Uuid::new_v4();
        log::info!("Run {} starting at {}", run_id, self.entry);

        let cursor = Cursor {
            run_id,
            next: self.entry.clone(),
            state: input,
            step: 0,
        };
        stream::try_unfold(cursor, move |cursor| self.step(cursor))
    }

    /// Run to completion and return the final conversation
    pub async fn invoke(&self, input: MessagesState) -> Result<MessagesState> {
        let mut final_state = input.clone();
        let mut updates = Box::pin(self.stream(input));
        while let Some(update) = updates.try_next().await? {
            final_state = update.messages;
        }
        Ok(final_state)
    }

    async fn step(&self, mut cursor: Cursor) -> Result<Option<(NodeUpdate, Cursor)>> {
        if cursor.next == END {
            log::info!("Run {} finished after {} steps", cursor.run_id, cursor.step);
            return Ok(None);
        }

        cursor.step += 1;
        if cursor.step > self.config.recursion_limit {
            log::error!(
                "Run {} hit the recursion limit of {}",
                cursor.run_id,
                self.config.recursion_limit
            );
            return Err(GraphError::RecursionLimit(self.config.recursion_limit).into());
        }

        let node = std::mem::take(&mut cursor.next);
        let agent = self
            .agent(&node)
            .ok_or_else(|| anyhow::anyhow!("Node not found: {}", node))?;

        log::info!("Run {} step {}: entering {}", cursor.run_id, cursor.step, node);

        let turn = agent.call(&cursor.state).await?;
        let before = cursor.state.len();

        let next = match turn {
            AgentTurn::Handoff(command) => {
                if !self.can_route(&node, &command.goto) {
                    return Err(GraphError::InvalidRoute {
                        from: node,
                        to: command.goto,
                    }
                    .into());
                }
                cursor.state.merge(command.update)?;
                command.goto
            }
            AgentTurn::Finished(state) => {
                cursor.state.merge(state)?;
                match self.next_fixed(&node) {
                    Some(target) => {
                        if self.config.handoff_back_messages && target != END {
                            push_handoff_back(&mut cursor.state, &node, target, cursor.step);
                        }
                        target.to_string()
                    }
                    None => END.to_string(),
                }
            }
        };

        log::info!("Run {} routing {} -> {}", cursor.run_id, node, next);

        let update = NodeUpdate {
            run_id: cursor.run_id,
            step: cursor.step,
            node,
            appended: cursor.state.messages()[before..].to_vec(),
            messages: cursor.state.clone(),
            next: next.clone(),
            completed_at: Utc::now(),
        };
        cursor.next = next;

        Ok(Some((update, cursor)))
    }
}

/// Record `node` handing control back to `target` along a fixed edge
fn push_handoff_back(state: &mut MessagesState, node: &str, target: &str, step: usize) {
    let tool_name = format!("transfer_back_to_{}", target);
    let call_id = format!("call_back_{}_{}", node, step);

    state.push(
        Message::assistant(format!("Transferring back to {}", target))
            .with_name(node)
            .with_tool_calls(vec![ToolCall::new(&call_id, &tool_name, "{}")]),
    );
    state.push(Message::tool(
        format!("Successfully transferred back to {}", target),
        tool_name,
        call_id,
    ));
}
