// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The command queue between the game thread and the rendering thread.

use std::fmt;

/// A deferred unit of work executed on the rendering thread against its state `T`.
pub type RenderCommand<T> = Box<dyn FnOnce(&mut T) + Send + 'static>;

/// A multi-producer queue of [`RenderCommand`]s drained by the rendering thread.
///
/// The game thread enqueues through cloned [`RenderCommandSender`]s. The rendering
/// thread owns the queue and calls [`RenderCommandQueue::execute_pending`] at its
/// frame boundary. Commands enqueued while the queue is being drained run on the
/// next drain, so the rendering thread is never re-entered.
pub struct RenderCommandQueue<T: 'static> {
    sender: flume::Sender<RenderCommand<T>>,
    receiver: flume::Receiver<RenderCommand<T>>,
}

impl<T: 'static> RenderCommandQueue<T> {
    /// Creates a new queue with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::info!("Render command queue initialized.");
        Self { sender, receiver }
    }

    /// Enqueues a command, logging an error if the rendering side is gone.
    pub fn enqueue<F>(&self, command: F)
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        log::trace!("Enqueueing a render command.");
        if let Err(e) = self.sender.send(Box::new(command)) {
            log::error!("Failed to enqueue render command: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a new producer handle for another thread.
    pub fn sender(&self) -> RenderCommandSender<T> {
        RenderCommandSender {
            sender: self.sender.clone(),
        }
    }

    /// Runs every command that was queued when the call started, in order.
    ///
    /// ## Returns
    /// The number of commands executed.
    pub fn execute_pending(&self, target: &mut T) -> usize {
        let pending = self.receiver.len();
        let mut executed = 0;
        for command in self.receiver.try_iter().take(pending) {
            command(target);
            executed += 1;
        }
        if executed > 0 {
            log::trace!("Executed {executed} render commands.");
        }
        executed
    }

    /// Number of commands waiting.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<T: 'static> Default for RenderCommandQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for RenderCommandQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCommandQueue")
            .field("pending", &self.receiver.len())
            .finish()
    }
}

/// A cloneable producer handle of a [`RenderCommandQueue`].
pub struct RenderCommandSender<T: 'static> {
    sender: flume::Sender<RenderCommand<T>>,
}

impl<T: 'static> RenderCommandSender<T> {
    /// Enqueues a command. Returns `false` if the queue was dropped.
    pub fn enqueue<F>(&self, command: F) -> bool
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        match self.sender.send(Box::new(command)) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to enqueue render command: {e}. Receiver likely disconnected.");
                false
            }
        }
    }
}

impl<T: 'static> Clone for RenderCommandSender<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: 'static> fmt::Debug for RenderCommandSender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCommandSender").finish_non_exhaustive()
    }
}
