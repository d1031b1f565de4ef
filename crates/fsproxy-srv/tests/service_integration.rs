// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! End-to-end flows through the service and the handle table

mod common;

use std::sync::Arc;

use common::{FixtureController, NoContent};
use fsproxy_core::{FsError, ServiceConfig, TracingAccessLogReporter};
use fsproxy_proto::{
    DirectoryEntry, EntryType, OpenMode, ResultCode, SaveDataDescriptor, SaveDataInfo,
    SaveDataRank, SaveDataSpaceId, SaveDataType, StorageId,
};
use fsproxy_srv::{FspSrv, HandleTable, Session};

const TITLE: u64 = 0x0100_0000_0000_A000;

fn user_save(save_id: u64) -> SaveDataDescriptor {
    SaveDataDescriptor {
        title_id: TITLE,
        user_id: [0x11; 16],
        save_id,
        save_type: SaveDataType::SaveData,
        rank: SaveDataRank::Primary,
        index: 0,
    }
}

fn service(controller: FixtureController) -> FspSrv {
    FspSrv::new(
        Arc::new(controller),
        Arc::new(NoContent),
        Arc::new(TracingAccessLogReporter),
        ServiceConfig::default(),
    )
}

#[test]
fn test_save_round_trip_through_handles() {
    let srv = service(FixtureController::new());
    let descriptor = user_save(1).encode();
    srv.create_save_data_file_system(&descriptor, 0x11).unwrap();

    let mut table = HandleTable::new();
    let fs = srv
        .open_save_data_file_system(SaveDataSpaceId::NandUser.raw(), &descriptor)
        .unwrap();
    let fs_handle = table.insert(fs);

    let fs = table.file_system(fs_handle).unwrap();
    fs.create_directory("/slots").unwrap();
    fs.create_file("/slots/0.sav", 0).unwrap();
    let file = fs.open_file("/slots/0.sav", OpenMode::ReadWrite.raw()).unwrap();
    let file_handle = table.insert(file);

    let file = table.file(file_handle).unwrap();
    file.write(0, 0, 5, b"hello").unwrap();
    file.flush().unwrap();
    let mut out = [0u8; 16];
    assert_eq!(file.read(0, 0, 16, &mut out).unwrap(), 5);
    assert_eq!(&out[..5], b"hello");
    table.close(file_handle).unwrap();

    let fs = table.file_system(fs_handle).unwrap();
    assert_eq!(fs.get_entry_type("/slots/0.sav").unwrap(), EntryType::File);
    assert_eq!(fs.get_free_space_size("/"), 0x1000);
    let mut dir = fs.open_directory("/slots", 0).unwrap();
    let mut packed = vec![0u8; DirectoryEntry::SIZE * 4];
    assert_eq!(dir.read(&mut packed), 1);
    let entry = DirectoryEntry::decode(&packed).unwrap();
    assert_eq!(entry, DirectoryEntry::new("0.sav", EntryType::File, 5));

    assert!(matches!(table.close(fs_handle).unwrap(), Session::FileSystem(_)));
    assert!(table.is_empty());
}

#[test]
fn test_info_reader_reports_created_saves() {
    let srv = service(FixtureController::new());
    srv.create_save_data_file_system(&user_save(2).encode(), 0).unwrap();
    let system = SaveDataDescriptor {
        user_id: [0; 16],
        save_type: SaveDataType::SystemSaveData,
        ..user_save(0)
    };
    srv.create_save_data_file_system_by_system_save_data_id(&system.encode())
        .unwrap();

    let fs = srv
        .open_save_data_file_system(SaveDataSpaceId::NandUser.raw(), &user_save(2).encode())
        .unwrap();
    fs.create_file("/blob", 0x20).unwrap();

    let mut reader = srv.open_save_data_info_reader();
    let mut out = vec![0u8; SaveDataInfo::SIZE * 8];
    assert_eq!(reader.read(&mut out), 2);
    let first = SaveDataInfo::decode(&out).unwrap();
    assert_eq!(first.space, SaveDataSpaceId::NandSystem);
    assert_eq!(first.save_type, SaveDataType::SystemSaveData);
    let second = SaveDataInfo::decode(&out[SaveDataInfo::SIZE..]).unwrap();
    assert_eq!(second.space, SaveDataSpaceId::NandUser);
    assert_eq!(second.save_type, SaveDataType::SaveData);
    assert_eq!(second.save_id, 2);
    assert_eq!(second.title_id, TITLE);
    assert_eq!(second.user_id, [0x11; 16]);
    assert_eq!(second.save_image_size, 0x20);
    assert_eq!(reader.read(&mut out), 0);

    let mut sd_only = srv
        .open_save_data_info_reader_by_save_data_space_id(SaveDataSpaceId::SdCardUser.raw())
        .unwrap();
    assert!(sd_only.read_records(4).is_empty());
}

#[test]
fn test_read_only_save_keeps_backing_intact() {
    let srv = service(FixtureController::new());
    let descriptor = user_save(3).encode();
    srv.create_save_data_file_system(&descriptor, 0).unwrap();
    let writable = srv
        .open_save_data_file_system(SaveDataSpaceId::NandUser.raw(), &descriptor)
        .unwrap();
    writable.create_file("/keep", 3).unwrap();

    let fs = srv
        .open_read_only_save_data_file_system(SaveDataSpaceId::NandUser.raw(), &descriptor)
        .unwrap();
    let err = fs.delete_file("/keep").unwrap_err();
    assert_eq!(err.result_code(), ResultCode::PERMISSION_DENIED);
    let err = fs.open_file("/keep", OpenMode::Write.raw()).unwrap_err();
    assert!(matches!(err, FsError::PermissionDenied));
    assert!(fs.open_file("/keep", OpenMode::Read.raw()).is_ok());
    assert_eq!(writable.get_entry_type("/keep").unwrap(), EntryType::File);
}

#[test]
fn test_missing_save_and_storage_codes() {
    let srv = service(FixtureController::new().with_romfs(TITLE, b"romfs!"));
    let err = srv
        .open_save_data_file_system(SaveDataSpaceId::NandUser.raw(), &user_save(9).encode())
        .unwrap_err();
    assert_eq!(err.result_code(), ResultCode::ENTITY_NOT_FOUND);

    let storage = srv
        .open_data_storage_by_data_id(StorageId::NandUser.raw(), TITLE)
        .unwrap();
    let mut out = [0u8; 6];
    assert_eq!(storage.read(0, 6, &mut out).unwrap(), 6);
    assert_eq!(&out, b"romfs!");

    let err = srv
        .open_data_storage_by_data_id(StorageId::NandUser.raw(), TITLE + 1)
        .unwrap_err();
    assert_eq!(err.result_code(), ResultCode::UNKNOWN);
    let err = srv.open_data_storage_by_data_id(42, TITLE).unwrap_err();
    assert_eq!(err.result_code(), ResultCode::INVALID_ARGUMENT);
}

#[test]
fn test_sd_card_presence() {
    let srv = service(FixtureController::new());
    let fs = srv.open_sd_card_file_system().unwrap();
    fs.create_directory("/Nintendo").unwrap();
    assert_eq!(fs.get_total_space_size("/"), 0x4000);

    let mut missing = FixtureController::new();
    missing.sdmc = None;
    let err = service(missing).open_sd_card_file_system().unwrap_err();
    assert_eq!(err.result_code(), ResultCode::SD_CARD_NOT_FOUND);
}
