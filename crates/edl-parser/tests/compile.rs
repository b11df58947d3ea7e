//! End-to-end compilation of TrainingJob fixtures
//!
//! Each test loads a TrainingJob manifest the way a user would write it and
//! checks the workload units handed to the apply layer.

use edl_common::crd::TrainingJob;
use edl_common::Error;
use edl_parser::{compile_training_job, DefaultJobParser, JobParser, WorkloadKind};

fn load(name: &str) -> TrainingJob {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    let yaml = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"));
    serde_yaml::from_str(&yaml).unwrap_or_else(|e| panic!("parse {path}: {e}"))
}

fn env_value(unit: &edl_parser::WorkloadUnit, container: &str, name: &str) -> Option<String> {
    unit.container(container)?
        .env
        .as_ref()?
        .iter()
        .find(|e| e.name == name)?
        .value
        .clone()
}

#[test]
fn test_fault_tolerant_job_compiles_with_defaults() {
    let compiled = compile_training_job(&DefaultJobParser::default(), load("wide2.yaml"))
        .expect("wide2 should compile");

    let pserver = &compiled.pserver;
    assert_eq!(pserver.name, "wide2-pserver");
    assert_eq!(pserver.namespace, "ns1");
    assert_eq!(pserver.kind, WorkloadKind::ReplicaSet);
    assert_eq!(pserver.replicas, 2);
    assert_eq!(pserver.containers().len(), 1);

    let container = pserver.container("pserver").expect("pserver container");
    assert_eq!(
        container.command,
        Some(vec![
            "paddle_k8s".to_string(),
            "start_new_pserver".to_string()
        ])
    );
    let ports: Vec<String> = container
        .ports
        .iter()
        .flatten()
        .filter_map(|p| p.name.clone())
        .collect();
    assert_eq!(ports, vec!["jobport-7164", "jobport-7165"]);

    let trainer = &compiled.trainer;
    assert_eq!(trainer.name, "wide2-trainer");
    assert_eq!(trainer.kind, WorkloadKind::Job);
    assert_eq!(trainer.replicas, 4);
    assert_eq!(
        trainer.container("trainer").and_then(|c| c.command.clone()),
        Some(vec![
            "paddle_k8s".to_string(),
            "start_new_trainer".to_string()
        ])
    );
    assert_eq!(
        trainer.pod_spec().and_then(|p| p.restart_policy.as_deref()),
        Some("Never")
    );

    let master = &compiled.master;
    assert_eq!(master.name, "wide2-master");
    assert_eq!(master.replicas, 1);
    assert_eq!(master.containers().len(), 2);
}

#[test]
fn test_wide2_environment() {
    let compiled =
        compile_training_job(&DefaultJobParser::default(), load("wide2.yaml")).unwrap();
    let trainer = &compiled.trainer;

    assert_eq!(env_value(trainer, "trainer", "PADDLE_JOB_NAME").as_deref(), Some("wide2"));
    assert_eq!(env_value(trainer, "trainer", "PADDLE_INIT_PORT").as_deref(), Some("7164"));
    assert_eq!(env_value(trainer, "trainer", "PADDLE_INIT_TRAINER_COUNT").as_deref(), Some("2"));
    assert_eq!(env_value(trainer, "trainer", "PADDLE_INIT_NUM_PASSES").as_deref(), Some("1"));
    assert_eq!(env_value(trainer, "trainer", "PADDLE_INIT_USE_GPU").as_deref(), Some("0"));

    // pserver and trainer share one environment
    assert_eq!(
        compiled.pserver.container("pserver").and_then(|c| c.env.clone()),
        trainer.container("trainer").and_then(|c| c.env.clone())
    );
}

#[test]
fn test_elastic_job_without_fault_tolerance_is_rejected() {
    let parser = DefaultJobParser::default();
    let err = parser
        .validate(load("elastic_without_fault_tolerance.yaml"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidElasticConfiguration {
            min_instance: 4,
            max_instance: 8,
            ..
        }
    ));

    let result = compile_training_job(&parser, load("elastic_without_fault_tolerance.yaml"));
    assert!(result.is_err());
}

#[test]
fn test_gpu_job_carries_pod_settings() {
    let compiled =
        compile_training_job(&DefaultJobParser::default(), load("gpu_job.yaml")).unwrap();

    let trainer = &compiled.trainer;
    assert_eq!(trainer.namespace, "vision");
    assert_eq!(
        trainer.container("trainer").and_then(|c| c.command.clone()),
        Some(vec![
            "paddle_k8s".to_string(),
            "start_trainer".to_string(),
            "v2".to_string()
        ])
    );
    assert_eq!(env_value(trainer, "trainer", "PADDLE_INIT_TRAINER_COUNT").as_deref(), Some("4"));
    assert_eq!(env_value(trainer, "trainer", "PADDLE_INIT_USE_GPU").as_deref(), Some("1"));
    assert_eq!(env_value(trainer, "trainer", "PADDLE_INIT_NUM_PASSES").as_deref(), Some("20"));

    let ports: Vec<i32> = trainer
        .container("trainer")
        .and_then(|c| c.ports.clone())
        .unwrap_or_default()
        .iter()
        .map(|p| p.container_port)
        .collect();
    assert_eq!(ports, vec![9000, 9001, 9002]);

    for unit in compiled.units() {
        let pod = unit.pod_spec().expect("pod spec");
        assert_eq!(pod.host_network, Some(true), "{}", unit.name);
        assert_eq!(pod.volumes.as_ref().map(Vec::len), Some(1), "{}", unit.name);
        assert_eq!(
            pod.image_pull_secrets
                .as_ref()
                .map(|s| s[0].name.as_str()),
            Some("regcred"),
            "{}",
            unit.name
        );
        assert_eq!(
            unit.containers()[0].image.as_deref(),
            Some("registry.local/paddle:gpu")
        );
    }

    // pserver gets no volume mounts; trainer and master do
    assert!(compiled
        .pserver
        .container("pserver")
        .and_then(|c| c.volume_mounts.as_ref())
        .is_none());
    assert!(compiled
        .master
        .container("master")
        .and_then(|c| c.volume_mounts.as_ref())
        .is_some());
}

#[test]
fn test_manifests_are_native_resources() {
    let compiled =
        compile_training_job(&DefaultJobParser::default(), load("wide2.yaml")).unwrap();
    let manifests = compiled.manifests().unwrap();

    let kinds: Vec<(&str, &str)> = manifests
        .iter()
        .map(|m| {
            (
                m["apiVersion"].as_str().unwrap_or_default(),
                m["kind"].as_str().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("apps/v1", "ReplicaSet"),
            ("batch/v1", "Job"),
            ("apps/v1", "ReplicaSet")
        ]
    );

    let pserver = &manifests[0];
    assert_eq!(pserver["spec"]["selector"]["matchLabels"]["paddle-job-pserver"], "wide2");
    assert_eq!(
        pserver["spec"]["template"]["metadata"]["labels"]["paddle-job-pserver"],
        "wide2"
    );

    let env = &manifests[1]["spec"]["template"]["spec"]["containers"][0]["env"];
    assert_eq!(env[14]["name"], "NAMESPACE");
    assert_eq!(env[14]["valueFrom"]["fieldRef"]["fieldPath"], "metadata.namespace");
    assert!(env[14].get("value").is_none());
    assert_eq!(env[15]["valueFrom"]["fieldRef"]["fieldPath"], "status.podIP");
}

#[test]
fn test_regenerating_unchanged_job_is_byte_identical() {
    let parser = DefaultJobParser::default();
    let first = compile_training_job(&parser, load("gpu_job.yaml")).unwrap();
    let second = compile_training_job(&parser, load("gpu_job.yaml")).unwrap();
    assert_eq!(first.to_yaml().unwrap(), second.to_yaml().unwrap());
}
