// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The filesystem-proxy service
//!
//! Every operation takes the raw values a guest request carries. Enum ids are decoded here,
//! mount points are resolved through the injected [`FileSystemController`], and the result is
//! wrapped in a session object.

use std::fmt;
use std::sync::Arc;

use fsproxy_core::access_log::string_from_zero_terminated;
use fsproxy_core::{
    storage_for_save_data_space, AccessLogReporter, ContentProvider, Event, FileSystemController,
    FsError, FsResult, ServiceConfig, SignalEvent, SizeGetter,
};
use fsproxy_proto::{
    AccessLogVersion, BisPartitionId, ContentRecordType, ContentStorageId, FileSystemType,
    ImageDirectoryId, LogMode, SaveDataDescriptor, SaveDataSpaceId, StorageId,
};
use fsproxy_vfs::VirtualDir;
use tracing::{debug, error, info, warn};

use crate::session::{
    decode_raw, EventNotifierSession, FileSystemSession, SaveDataInfoReaderSession,
    StorageSession,
};

fn hex_id(id: u64) -> String {
    format!("{id:016X}")
}

pub struct FspSrv {
    controller: Arc<dyn FileSystemController>,
    content: Arc<dyn ContentProvider>,
    reporter: Arc<dyn AccessLogReporter>,
    config: ServiceConfig,
    current_process_id: u64,
    log_mode: LogMode,
    sd_card_detection_event: Arc<SignalEvent>,
    game_card_detection_event: Arc<SignalEvent>,
}

impl FspSrv {
    pub fn new(
        controller: Arc<dyn FileSystemController>,
        content: Arc<dyn ContentProvider>,
        reporter: Arc<dyn AccessLogReporter>,
        config: ServiceConfig,
    ) -> Self {
        let log_mode = config.log_mode;
        Self {
            controller,
            content,
            reporter,
            config,
            current_process_id: 0,
            log_mode,
            sd_card_detection_event: Arc::new(SignalEvent::new("sd_card_detection")),
            game_card_detection_event: Arc::new(SignalEvent::new("game_card_detection")),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Host side of the SD card hot-plug notifier.
    pub fn sd_card_detection_event(&self) -> Arc<dyn Event> {
        self.sd_card_detection_event.clone()
    }

    /// Host side of the game card hot-plug notifier.
    pub fn game_card_detection_event(&self) -> Arc<dyn Event> {
        self.game_card_detection_event.clone()
    }

    pub fn current_process_id(&self) -> u64 {
        self.current_process_id
    }

    pub fn set_current_process(&mut self, pid: u64) {
        debug!(pid, "set current process");
        self.current_process_id = pid;
    }

    fn size_getter(&self, storage: StorageId) -> SizeGetter {
        SizeGetter::from_storage_id(self.controller.clone(), storage)
    }

    fn mount(&self, dir: VirtualDir, storage: StorageId) -> FileSystemSession {
        FileSystemSession::new(dir, self.size_getter(storage))
    }

    pub fn open_file_system_with_patch(
        &self,
        raw_type: u32,
        title_id: u64,
    ) -> FsResult<FileSystemSession> {
        let fs_type: FileSystemType = decode_raw(raw_type)?;
        let record = fs_type.content_record_type();
        debug!(fs_type = ?fs_type, title_id = %hex_id(title_id), "open file system with patch");
        let dir = self
            .content
            .open_patched_section(title_id, fs_type, record)
            .ok_or_else(|| {
                error!(title_id = %hex_id(title_id), record = ?record, "title has no such section");
                FsError::InvalidArgument
            })?;
        Ok(self.mount(dir, StorageId::Host))
    }

    pub fn open_bis_file_system(&self, raw_partition: u32) -> FsResult<FileSystemSession> {
        let partition: BisPartitionId = decode_raw(raw_partition)?;
        debug!(partition = ?partition, "open bis file system");
        let dir = self.controller.open_bis_partition(partition)?;
        Ok(self.mount(dir, StorageId::Host))
    }

    pub fn open_bis_storage(&self, raw_partition: u32) -> FsResult<StorageSession> {
        let partition: BisPartitionId = decode_raw(raw_partition)?;
        debug!(partition = ?partition, "open bis storage");
        let file = self.controller.open_bis_partition_storage(partition)?;
        Ok(StorageSession::new(file))
    }

    pub fn invalidate_bis_cache(&self) -> FsResult<()> {
        warn!("invalidate bis cache is a no-op");
        Ok(())
    }

    pub fn open_sd_card_file_system(&self) -> FsResult<FileSystemSession> {
        debug!("open sd card file system");
        let dir = self.controller.open_sdmc().map_err(|e| {
            error!(error = %e, "sd card is unavailable");
            FsError::SdCardNotFound
        })?;
        Ok(self.mount(dir, StorageId::SdCard))
    }

    /// Creates a user save in the `NandUser` space. `user_id` is only logged.
    pub fn create_save_data_file_system(&self, descriptor: &[u8], user_id: u128) -> FsResult<()> {
        let descriptor = SaveDataDescriptor::decode(descriptor)?;
        debug!(descriptor = %descriptor, uid = %format!("{user_id:032X}"), "create save data");
        self.controller
            .create_save_data(SaveDataSpaceId::NandUser, &descriptor)?;
        Ok(())
    }

    pub fn create_save_data_file_system_by_system_save_data_id(
        &self,
        descriptor: &[u8],
    ) -> FsResult<()> {
        let descriptor = SaveDataDescriptor::decode(descriptor)?;
        debug!(descriptor = %descriptor, "create system save data");
        self.controller
            .create_save_data(SaveDataSpaceId::NandSystem, &descriptor)?;
        Ok(())
    }

    fn open_save_data(&self, raw_space: u8, descriptor: &[u8]) -> FsResult<(VirtualDir, StorageId)> {
        let space: SaveDataSpaceId = decode_raw(raw_space)?;
        let descriptor = SaveDataDescriptor::decode(descriptor)?;
        debug!(space = ?space, descriptor = %descriptor, "open save data");
        let dir = self
            .controller
            .open_save_data(space, &descriptor)
            .map_err(|e| {
                error!(space = ?space, error = %e, "save data is unavailable");
                FsError::EntityNotFound
            })?;
        Ok((dir, storage_for_save_data_space(space)))
    }

    pub fn open_save_data_file_system(
        &self,
        raw_space: u8,
        descriptor: &[u8],
    ) -> FsResult<FileSystemSession> {
        let (dir, storage) = self.open_save_data(raw_space, descriptor)?;
        Ok(self.mount(dir, storage))
    }

    pub fn open_save_data_file_system_by_system_save_data_id(
        &self,
        raw_space: u8,
        descriptor: &[u8],
    ) -> FsResult<FileSystemSession> {
        self.open_save_data_file_system(raw_space, descriptor)
    }

    pub fn open_read_only_save_data_file_system(
        &self,
        raw_space: u8,
        descriptor: &[u8],
    ) -> FsResult<FileSystemSession> {
        let (dir, storage) = self.open_save_data(raw_space, descriptor)?;
        Ok(self.mount(dir.read_only(), storage))
    }

    pub fn open_save_data_info_reader(&self) -> SaveDataInfoReaderSession {
        debug!(spaces = ?self.config.info_reader_spaces, "open save data info reader");
        SaveDataInfoReaderSession::new(self.controller.as_ref(), &self.config.info_reader_spaces)
    }

    pub fn open_save_data_info_reader_by_save_data_space_id(
        &self,
        raw_space: u8,
    ) -> FsResult<SaveDataInfoReaderSession> {
        let space: SaveDataSpaceId = decode_raw(raw_space)?;
        debug!(space = ?space, "open save data info reader for one space");
        Ok(SaveDataInfoReaderSession::new(self.controller.as_ref(), &[space]))
    }

    pub fn open_image_directory_file_system(&self, raw_id: u32) -> FsResult<FileSystemSession> {
        let id: ImageDirectoryId = decode_raw(raw_id)?;
        debug!(id = ?id, "open image directory");
        let storage = match id {
            ImageDirectoryId::Nand => StorageId::NandUser,
            ImageDirectoryId::SdCard => StorageId::SdCard,
        };
        let dir = self.controller.image_directory(id).ok_or_else(|| {
            error!(id = ?id, "image directory is unavailable");
            FsError::InvalidArgument
        })?;
        Ok(self.mount(dir, storage))
    }

    pub fn open_content_storage_file_system(&self, raw_id: u32) -> FsResult<FileSystemSession> {
        let id: ContentStorageId = decode_raw(raw_id)?;
        debug!(id = ?id, "open content storage");
        let storage = match id {
            ContentStorageId::System => StorageId::NandSystem,
            ContentStorageId::User => StorageId::NandUser,
            ContentStorageId::SdCard => StorageId::SdCard,
        };
        let dir = self.controller.content_directory(id).ok_or_else(|| {
            error!(id = ?id, "content storage is unavailable");
            FsError::InvalidArgument
        })?;
        Ok(self.mount(dir, storage))
    }

    pub fn set_global_access_log_mode(&mut self, raw_mode: u32) -> FsResult<()> {
        let mode: LogMode = decode_raw(raw_mode)?;
        debug!(mode = ?mode, "set global access log mode");
        self.log_mode = mode;
        Ok(())
    }

    pub fn get_global_access_log_mode(&self) -> LogMode {
        self.log_mode
    }

    pub fn output_access_log_to_sd_card(&self, buffer: &[u8]) -> FsResult<()> {
        let log = string_from_zero_terminated(buffer);
        debug!(len = log.len(), "output access log");
        self.reporter
            .save_filesystem_access_report(self.log_mode, &log);
        Ok(())
    }

    pub fn get_access_log_version_info(&self) -> (AccessLogVersion, u32) {
        (AccessLogVersion::LATEST, self.config.access_log_program_index)
    }

    pub fn open_data_storage_by_current_process(&self) -> FsResult<StorageSession> {
        debug!(pid = self.current_process_id, "open data storage of current process");
        let romfs = self.controller.open_romfs_current_process().map_err(|e| {
            error!(error = %e, "current process has no data storage");
            FsError::OperationFailed
        })?;
        Ok(StorageSession::new(romfs))
    }

    pub fn open_data_storage_by_data_id(
        &self,
        raw_storage: u8,
        title_id: u64,
    ) -> FsResult<StorageSession> {
        let storage: StorageId = decode_raw(raw_storage)?;
        debug!(storage = ?storage, title_id = %hex_id(title_id), "open data storage");
        match self
            .controller
            .open_romfs(title_id, storage, ContentRecordType::Data)
        {
            Ok(base) => Ok(StorageSession::new(self.content.patch_romfs(
                title_id,
                base,
                ContentRecordType::Data,
            ))),
            Err(e) => {
                if let Some(archive) = self.content.synthesize_system_archive(title_id) {
                    debug!(title_id = %hex_id(title_id), "using synthesized system archive");
                    return Ok(StorageSession::new(archive));
                }
                error!(title_id = %hex_id(title_id), storage = ?storage, error = %e, "data storage is unavailable");
                Err(FsError::OperationFailed)
            }
        }
    }

    pub fn open_patch_data_storage_by_current_process(
        &self,
        raw_storage: u8,
        title_id: u64,
    ) -> FsResult<StorageSession> {
        debug!(raw_storage, title_id = %hex_id(title_id), "open patch data storage");
        Err(FsError::EntityNotFound)
    }

    pub fn open_sd_card_detection_event_notifier(&self) -> EventNotifierSession {
        debug!("open sd card detection event notifier");
        EventNotifierSession::new(self.sd_card_detection_event.clone())
    }

    pub fn open_game_card_detection_event_notifier(&self) -> EventNotifierSession {
        debug!("open game card detection event notifier");
        EventNotifierSession::new(self.game_card_detection_event.clone())
    }

    pub fn set_sd_card_encryption_seed(&self, seed: [u8; 16]) -> FsResult<()> {
        info!(seed = %format!("{:032X}", u128::from_be_bytes(seed)), "sd card encryption seed set");
        Ok(())
    }
}

impl fmt::Debug for FspSrv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FspSrv")
            .field("config", &self.config)
            .field("current_process_id", &self.current_process_id)
            .field("log_mode", &self.log_mode)
            .finish_non_exhaustive()
    }
}
